// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Depth endpoint handler

use axum::extract::State;
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::response::DepthRasterResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;
use crate::raster::encode_geotiff;
use crate::vision::decode_image_bytes_with_limit;

/// POST /depth - Estimate a height raster for a tile
///
/// Accepts a multipart upload (field `file`) and returns a single-band
/// float32 TIFF with the same width and height as the upload, named
/// `height.tif`. The raster carries no CRS or geotransform.
///
/// # Errors
/// - 400 Bad Request: missing file part, or the bytes are not an image
/// - 413 Payload Too Large: upload exceeds the configured limit
/// - 503 Service Unavailable: depth model not loaded
/// - 500 Internal Server Error: inference or encoding failed
pub async fn depth_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<DepthRasterResponse, ApiError> {
    let upload = read_upload(multipart).await?;

    let (image, image_info) = decode_image_bytes_with_limit(&upload.bytes, state.max_upload_bytes)
        .map_err(|e| {
            warn!("Failed to decode image: {}", e);
            ApiError::from(e)
        })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let estimator = state
        .vision_model_manager
        .get_depth_estimator()
        .ok_or_else(|| {
            warn!("Depth model not loaded");
            ApiError::ServiceUnavailable("Depth model not loaded".to_string())
        })?;

    let start = Instant::now();

    let depth = tokio::task::spawn_blocking(move || estimator.estimate(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("Depth task failed: {}", e)))?
        .map_err(|e| {
            warn!("Depth estimation failed: {:#}", e);
            ApiError::InternalError(format!("Depth estimation failed: {}", e))
        })?;

    if depth.dimensions() != (image_info.width, image_info.height) {
        return Err(ApiError::InternalError(format!(
            "Depth raster is {}x{}, expected {}x{}",
            depth.width(),
            depth.height(),
            image_info.width,
            image_info.height
        )));
    }

    let bytes = encode_geotiff(&depth)
        .map_err(|e| ApiError::InternalError(format!("Raster encoding failed: {}", e)))?;

    info!(
        "Depth complete: {}x{} raster, {} bytes, {}ms",
        depth.width(),
        depth.height(),
        bytes.len(),
        start.elapsed().as_millis()
    );

    Ok(DepthRasterResponse::new(bytes, depth.width(), depth.height()))
}
