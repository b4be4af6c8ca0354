// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Depth response: a downloadable float32 TIFF

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::raster::{RASTER_CONTENT_TYPE, RASTER_FILENAME};

/// Encoded raster bytes sent as an `image/tiff` attachment
#[derive(Debug, Clone)]
pub struct DepthRasterResponse {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl DepthRasterResponse {
    pub fn new(bytes: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            bytes: bytes.into(),
            width,
            height,
        }
    }

    pub fn content_disposition() -> String {
        format!("attachment; filename=\"{}\"", RASTER_FILENAME)
    }
}

impl IntoResponse for DepthRasterResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, RASTER_CONTENT_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, Self::content_disposition()),
            ],
            self.bytes,
        )
            .into_response()
    }
}
