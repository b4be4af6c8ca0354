// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP clients used by the fetch-tile tool
//!
//! - [`TileClient`] downloads a slippy-map tile and checks it is a real PNG
//! - [`ServiceClient`] posts a tile to the `/depth` and `/classify` endpoints

pub mod service;
pub mod tile;

use reqwest::StatusCode;
use thiserror::Error;

pub use service::{ServiceClient, DEFAULT_API_BASE, SERVICE_TIMEOUT};
pub use tile::{TileClient, DEFAULT_USER_AGENT, MIN_TILE_BYTES, TILE_TIMEOUT};

/// Errors raised by the outbound clients
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Server did not return a valid PNG tile (content-type: {content_type:?}, {len} bytes)")]
    InvalidTile {
        content_type: Option<String>,
        len: usize,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Turn a non-2xx response into [`FetchError::Status`], keeping its body
pub(crate) async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status {
        url: url.to_string(),
        status,
        body,
    })
}
