// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tile download tests against a local tile server

use super::helpers::*;
use atlassynth::client::{FetchError, TileClient, DEFAULT_USER_AGENT, MIN_TILE_BYTES};
use atlassynth::tiles::latlon_to_tile_xy;

fn template(base: &str, route: &str) -> String {
    format!("{}/{}/{{z}}/{{x}}/{{y}}.png", base, route)
}

#[tokio::test]
async fn test_fetch_valid_tile() {
    let base = spawn_tile_server().await;
    let client = TileClient::new(&template(&base, "good"), DEFAULT_USER_AGENT).unwrap();
    let tile = latlon_to_tile_xy(37.7749, -122.4194, 13).unwrap();

    let bytes = client.fetch(&tile).await.unwrap();
    assert!(bytes.len() >= MIN_TILE_BYTES);
    assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let base = spawn_tile_server().await;
    let client = TileClient::new(&template(&base, "good"), "curl/8.0").unwrap();
    let tile = latlon_to_tile_xy(0.0, 0.0, 2).unwrap();

    match client.fetch(&tile).await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 403),
        other => panic!("expected 403, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_fetch_rejects_non_png() {
    let base = spawn_tile_server().await;
    let client = TileClient::new(&template(&base, "html"), DEFAULT_USER_AGENT).unwrap();
    let tile = latlon_to_tile_xy(0.0, 0.0, 2).unwrap();

    let err = client.fetch(&tile).await.unwrap_err();
    match err {
        FetchError::InvalidTile { content_type, len } => {
            assert_eq!(content_type.as_deref(), Some("text/html"));
            assert!(len >= MIN_TILE_BYTES);
        }
        other => panic!("expected InvalidTile, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_rejects_undersized_png() {
    let base = spawn_tile_server().await;
    let client = TileClient::new(&template(&base, "tiny"), DEFAULT_USER_AGENT).unwrap();
    let tile = latlon_to_tile_xy(0.0, 0.0, 2).unwrap();

    let err = client.fetch(&tile).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidTile { len: 200, .. }));
    assert!(err.to_string().contains("valid PNG tile"));
}

#[tokio::test]
async fn test_fetch_surfaces_server_error() {
    let base = spawn_tile_server().await;
    let client = TileClient::new(&template(&base, "error"), DEFAULT_USER_AGENT).unwrap();
    let tile = latlon_to_tile_xy(0.0, 0.0, 2).unwrap();

    match client.fetch(&tile).await.unwrap_err() {
        FetchError::Status { status, body, url } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "tile renderer down");
            assert!(url.ends_with("/error/2/2/2.png"));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}
