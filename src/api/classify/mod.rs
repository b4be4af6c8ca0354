// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification endpoint module
//!
//! Provides POST /classify for tagging a tile with land-cover labels.

pub mod handler;
pub mod response;

pub use handler::classify_handler;
pub use response::ClassifyResponse;
