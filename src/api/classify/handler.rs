// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::response::ClassifyResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;
use crate::vision::decode_image_bytes_with_limit;

/// POST /classify - Tag a tile with land-cover labels
///
/// Accepts a multipart upload (field `file`) and returns the top-k
/// `{label, score}` pairs from the fixed land-cover vocabulary, highest
/// score first.
///
/// # Errors
/// - 400 Bad Request: missing file part, or the bytes are not an image
/// - 413 Payload Too Large: upload exceeds the configured limit
/// - 503 Service Unavailable: CLIP model not loaded
/// - 500 Internal Server Error: inference failed
pub async fn classify_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiError> {
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

    let classifier = state.vision_model_manager.get_classifier().ok_or_else(|| {
        warn!("Classifier not loaded");
        ApiError::ServiceUnavailable("Classification model not loaded".to_string())
    })?;

    let top_k = state.top_k;
    let start = Instant::now();

    let predictions = tokio::task::spawn_blocking(move || classifier.classify(&image, top_k))
        .await
        .map_err(|e| ApiError::InternalError(format!("Classification task failed: {}", e)))?
        .map_err(|e| {
            warn!("Classification failed: {:#}", e);
            ApiError::InternalError(format!("Classification failed: {}", e))
        })?;

    info!(
        "Classification complete: {:?} in {}ms",
        predictions.first().map(|p| (&p.label, p.score)),
        start.elapsed().as_millis()
    );

    Ok(Json(ClassifyResponse(predictions)))
}
