// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart image upload extraction shared by /classify and /depth

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use tracing::debug;

use super::errors::ApiError;

/// Form field the image is expected under
pub const UPLOAD_FIELD: &str = "file";

/// Raw bytes of one uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Read the uploaded image out of a multipart body
///
/// The `file` field wins; otherwise the first non-empty field is used so
/// clients that name the part differently still work. A body with no
/// non-empty part is rejected.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut fallback: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        debug!(
            "Multipart field {:?} ({:?}, {:?}): {} bytes",
            name,
            file_name,
            content_type,
            bytes.len()
        );

        let upload = Upload {
            file_name,
            content_type,
            bytes,
        };

        if name.as_deref() == Some(UPLOAD_FIELD) {
            if upload.bytes.is_empty() {
                return Err(ApiError::ValidationError {
                    field: UPLOAD_FIELD.to_string(),
                    message: "uploaded file is empty".to_string(),
                });
            }
            return Ok(upload);
        }

        if fallback.is_none() && !upload.bytes.is_empty() {
            fallback = Some(upload);
        }
    }

    fallback.ok_or_else(|| {
        ApiError::InvalidRequest(format!(
            "multipart body has no '{}' field",
            UPLOAD_FIELD
        ))
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidRequest(format!("malformed multipart body: {}", err.body_text()))
    }
}
