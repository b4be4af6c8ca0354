// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web Mercator slippy-map tile math

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

/// Default public raster tile server
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Deepest zoom level whose tile count fits comfortably in a u32 index
pub const MAX_ZOOM: u8 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum TileError {
    #[error("Latitude {0} is outside (-90, 90)")]
    InvalidLatitude(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    #[error("Zoom {0} exceeds maximum of 30")]
    InvalidZoom(u8),
}

/// A tile address under the standard XYZ scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Number of tiles along one axis at this zoom level
    pub fn tiles_per_axis(&self) -> u64 {
        1u64 << self.zoom
    }

    /// Expand `{z}`, `{x}` and `{y}` in a URL template
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Convert WGS84 latitude/longitude to the tile containing it
///
/// The Mercator projection is singular at the poles, so `|lat| >= 90` is
/// rejected. Latitudes beyond the projection's ±85.0511° cut-off, and the
/// antimeridian at lon = 180, clamp onto the edge tiles so every returned
/// index lies in `[0, 2^zoom)`.
pub fn latlon_to_tile_xy(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, TileError> {
    if !lat.is_finite() || lat.abs() >= 90.0 {
        return Err(TileError::InvalidLatitude(lat));
    }
    if !lon.is_finite() || lon.abs() > 180.0 {
        return Err(TileError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(TileError::InvalidZoom(zoom));
    }

    let n = (1u64 << zoom) as f64;
    let lat_rad = lat.to_radians();

    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    Ok(TileCoord {
        zoom,
        x: clamp_index(x, n),
        y: clamp_index(y, n),
    })
}

fn clamp_index(value: f64, n: f64) -> u32 {
    value.clamp(0.0, n - 1.0) as u32
}
