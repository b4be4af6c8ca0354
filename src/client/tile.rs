// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Slippy-map tile download

use bytes::Bytes;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, info};

use super::{check_status, FetchError};
use crate::tiles::TileCoord;

/// Tile servers such as OSM reject requests without an identifying agent
pub const DEFAULT_USER_AGENT: &str = "AtlasSynth/0.1 (https://github.com/yourname)";

/// Request timeout for tile downloads
pub const TILE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bodies shorter than this are error pages or placeholders, not tiles
pub const MIN_TILE_BYTES: usize = 1000;

const PNG_CONTENT_TYPE: &str = "image/png";

/// Client for a `{z}/{x}/{y}` tile server
pub struct TileClient {
    client: Client,
    url_template: String,
}

impl TileClient {
    /// Create a client for the given URL template and User-Agent
    pub fn new(url_template: &str, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(TILE_TIMEOUT)
            .user_agent(user_agent)
            .build()?;

        info!(
            "Tile client configured: template={}, user_agent={}",
            url_template, user_agent
        );

        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Download one tile
    ///
    /// Fails on a non-2xx status, a content type other than `image/png`,
    /// or a body shorter than [`MIN_TILE_BYTES`].
    pub async fn fetch(&self, coord: &TileCoord) -> Result<Bytes, FetchError> {
        let url = coord.url(&self.url_template);
        info!("Fetching tile {} from {}", coord, url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(&url, response).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?;
        debug!("Tile response: {:?}, {} bytes", content_type, body.len());

        validate_tile(content_type.as_deref(), &body)?;
        Ok(body)
    }
}

/// Check a downloaded body looks like a PNG tile
pub fn validate_tile(content_type: Option<&str>, body: &[u8]) -> Result<(), FetchError> {
    let is_png = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim())
        .is_some_and(|ct| ct.eq_ignore_ascii_case(PNG_CONTENT_TYPE));

    if !is_png || body.len() < MIN_TILE_BYTES {
        return Err(FetchError::InvalidTile {
            content_type: content_type.map(str::to_string),
            len: body.len(),
        });
    }
    Ok(())
}
