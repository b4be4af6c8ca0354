// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! fetch-tile: download one tile, then run it through /depth and /classify

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::client::{ServiceClient, TileClient, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
use crate::raster::RASTER_FILENAME;
use crate::tiles::{latlon_to_tile_xy, TileCoord, DEFAULT_TILE_URL};
use crate::vision::LabelScore;

/// File the downloaded tile is saved as
pub const TILE_FILENAME: &str = "tile.png";

/// Number of tags printed after classification
pub const PRINTED_TAGS: usize = 3;

/// Fetch a map tile and run it through the AtlasSynth service
#[derive(Parser, Debug, Clone)]
#[command(name = "atlassynth-fetch-tile")]
#[command(version)]
#[command(about = "Download a map tile and request its height raster and land-cover tags", long_about = None)]
pub struct Cli {
    /// Latitude in degrees (WGS84)
    #[arg(long, env = "ATLASSYNTH_LAT", default_value_t = 37.7749, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees (WGS84)
    #[arg(long, env = "ATLASSYNTH_LON", default_value_t = -122.4194, allow_negative_numbers = true)]
    pub lon: f64,

    /// Zoom level
    #[arg(long, env = "ATLASSYNTH_ZOOM", default_value_t = 13)]
    pub zoom: u8,

    /// Base URL of the AtlasSynth service
    #[arg(long, env = "ATLASSYNTH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Tile URL template with {z}, {x} and {y} placeholders
    #[arg(long, env = "ATLASSYNTH_TILE_URL", default_value = DEFAULT_TILE_URL)]
    pub tile_url: String,

    /// User-Agent sent to the tile server
    #[arg(long, env = "ATLASSYNTH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Directory tile.png and height.tif are written to
    #[arg(long, env = "ATLASSYNTH_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub tile: TileCoord,
    pub tile_path: PathBuf,
    pub raster_path: PathBuf,
    pub tags: Vec<LabelScore>,
}

/// Run the fetch, depth and classify steps in order, stopping at the first failure
pub async fn execute(cli: Cli) -> Result<FetchOutcome> {
    let tile = latlon_to_tile_xy(cli.lat, cli.lon, cli.zoom)?;
    let tiles = TileClient::new(&cli.tile_url, &cli.user_agent)?;
    let service = ServiceClient::new(&cli.api_base)?;

    println!("→ Fetching {}", tile.url(tiles.url_template()));
    let tile_bytes = tiles
        .fetch(&tile)
        .await
        .with_context(|| format!("failed to download tile {}", tile))?;

    let tile_path = write_output(&cli.output_dir, TILE_FILENAME, &tile_bytes).await?;
    info!("Saved {} ({} bytes)", tile_path.display(), tile_bytes.len());

    println!("→ Calling /depth");
    let raster = service
        .depth(tile_bytes.clone())
        .await
        .context("depth request failed")?;
    let raster_path = write_output(&cli.output_dir, RASTER_FILENAME, &raster).await?;
    println!("  Saved {}", raster_path.display());

    println!("→ Calling /classify");
    let mut tags = service
        .classify(tile_bytes)
        .await
        .context("classify request failed")?;
    tags.truncate(PRINTED_TAGS);
    println!("  Top tags: {}", format_tags(&tags));

    Ok(FetchOutcome {
        tile,
        tile_path,
        raster_path,
        tags,
    })
}

async fn write_output(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Render tags as `label (0.812), label (0.103)`
pub fn format_tags(tags: &[LabelScore]) -> String {
    tags.iter()
        .map(|t| format!("{} ({:.3})", t.label, t.score))
        .collect::<Vec<_>>()
        .join(", ")
}
