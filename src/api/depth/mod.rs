// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Depth endpoint module
//!
//! Provides POST /depth returning a float32 height raster.

pub mod handler;
pub mod response;

pub use handler::depth_handler;
pub use response::DepthRasterResponse;
