// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client for the classification and depth endpoints

use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use std::time::Duration;
use tracing::{debug, info};

use super::{check_status, FetchError};
use crate::api::UPLOAD_FIELD;
use crate::vision::LabelScore;

/// Where the service listens by default
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Request timeout for service calls
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

const TILE_FILE_NAME: &str = "tile.png";
const TILE_MIME: &str = "image/png";

/// Posts tiles to a running AtlasSynth service
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(SERVICE_TIMEOUT).build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Service client configured: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the tile to `/depth` and return the raw TIFF bytes
    pub async fn depth(&self, tile: Bytes) -> Result<Bytes, FetchError> {
        let response = self.post_tile("depth", tile).await?;
        Ok(response.bytes().await?)
    }

    /// POST the tile to `/classify` and return the ranked labels
    pub async fn classify(&self, tile: Bytes) -> Result<Vec<LabelScore>, FetchError> {
        let response = self.post_tile("classify", tile).await?;
        Ok(response.json().await?)
    }

    async fn post_tile(&self, endpoint: &str, tile: Bytes) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("POST {} ({} bytes)", url, tile.len());

        let part = Part::bytes(tile.to_vec())
            .file_name(TILE_FILE_NAME)
            .mime_str(TILE_MIME)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.client.post(&url).multipart(form).send().await?;
        check_status(&url, response).await
    }
}
