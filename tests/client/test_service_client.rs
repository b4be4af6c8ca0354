// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ServiceClient tests against the router served on a local port

use super::helpers::*;
use atlassynth::client::{FetchError, ServiceClient};
use atlassynth::raster::decode_geotiff;
use bytes::Bytes;
use std::sync::Arc;

#[tokio::test]
async fn test_depth_returns_raster_bytes() {
    let base = spawn_full_service().await;
    let client = ServiceClient::new(&base).unwrap();

    let raster = client.depth(Bytes::from(random_png_tile())).await.unwrap();
    let depth = decode_geotiff(&raster).unwrap();
    assert_eq!(depth.dimensions(), (256, 256));
    assert_eq!(depth.get(10, 10), Some(127.0));
}

#[tokio::test]
async fn test_classify_returns_ranked_tags() {
    let base = spawn_full_service().await;
    let client = ServiceClient::new(&format!("{}/", base)).unwrap();

    let tags = client.classify(Bytes::from(random_png_tile())).await.unwrap();
    let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["water", "urban", "forest"]);
}

#[tokio::test]
async fn test_unavailable_model_is_status_error() {
    let base = spawn_service(Some(Arc::new(FixedClassifier::new())), None).await;
    let client = ServiceClient::new(&base).unwrap();

    match client.depth(Bytes::from(random_png_tile())).await.unwrap_err() {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert!(body.contains("service_unavailable"));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_image_upload_is_status_error() {
    let base = spawn_full_service().await;
    let client = ServiceClient::new(&base).unwrap();

    let err = client
        .classify(Bytes::from_static(b"definitely not a png"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 400));
}
