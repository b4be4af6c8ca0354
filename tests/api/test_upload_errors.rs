// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Malformed upload tests
//!
//! Every bad upload must produce an error response, never an empty 200,
//! on both inference routes.

use super::helpers::*;
use atlassynth::vision::image_utils::MAX_IMAGE_SIZE;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

const ROUTES: [&str; 2] = ["/classify", "/depth"];

#[tokio::test]
async fn test_missing_multipart_boundary() {
    for uri in ROUTES {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _, _) = send(full_state(), request).await;
        assert!(status.is_client_error(), "{} returned {}", uri, status);
    }
}

#[tokio::test]
async fn test_multipart_without_parts() {
    for uri in ROUTES {
        let body = format!("--{}--\r\n", BOUNDARY).into_bytes();
        let (status, _, body) = send(full_state(), multipart_request(uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error_type(&body), "invalid_request");
    }
}

#[tokio::test]
async fn test_empty_file_part() {
    for uri in ROUTES {
        let (status, _, body) = send(full_state(), upload_request(uri, b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error_type(&body), "validation_error");
    }
}

#[tokio::test]
async fn test_truncated_png() {
    let png = png_tile(64, 64);
    let truncated = &png[..png.len() / 2];

    for uri in ROUTES {
        let (status, _, body) = send(full_state(), upload_request(uri, truncated)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error_type(&body), "validation_error");
    }
}

#[tokio::test]
async fn test_bad_image_rejected_even_without_models() {
    for uri in ROUTES {
        let state = state_with(None, None);
        let (status, _, _) = send(state, upload_request(uri, b"GIF89a-but-not-really")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_image_over_configured_limit() {
    for uri in ROUTES {
        let mut state = full_state();
        state.max_upload_bytes = 1024;

        let (status, _, body) = send(state, upload_request(uri, &vec![0x89u8; 4096])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{}", uri);
        assert_eq!(error_type(&body), "payload_too_large");
    }
}

#[tokio::test]
async fn test_body_far_over_limit_rejected_by_body_limit() {
    for uri in ROUTES {
        let mut state = full_state();
        state.max_upload_bytes = 1024;

        let (status, _, _) = send(state, upload_request(uri, &vec![0x89u8; 256 * 1024])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{}", uri);
    }
}

#[tokio::test]
async fn test_raised_limit_accepts_image_over_default_cap() {
    let png = incompressible_png(1900, 1900);
    assert!(png.len() > MAX_IMAGE_SIZE, "fixture is only {} bytes", png.len());

    let mut state = full_state();
    state.max_upload_bytes = 16 * 1024 * 1024;

    let (status, _, body) = send(state, upload_request("/classify", &png)).await;
    assert_eq!(status, StatusCode::OK);
    let predictions: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(predictions.len(), 3);
}

#[tokio::test]
async fn test_default_limit_accepts_image_just_under_cap() {
    // Multipart framing pushes the body past MAX_IMAGE_SIZE
    let png = incompressible_png(1850, 1850);
    assert!(png.len() < MAX_IMAGE_SIZE, "fixture is {} bytes", png.len());
    assert!(png.len() > MAX_IMAGE_SIZE - 512 * 1024);

    let (status, _, _) = send(full_state(), upload_request("/classify", &png)).await;
    assert_eq!(status, StatusCode::OK);
}
