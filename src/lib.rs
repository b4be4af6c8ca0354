// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod raster;
pub mod tiles;
pub mod version;
pub mod vision;

pub use api::{create_app, AppState};
pub use raster::{DepthMap, RasterError};
pub use tiles::{latlon_to_tile_xy, TileCoord, TileError};
pub use vision::{LabelScore, VisionModelManager};
