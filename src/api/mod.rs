// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classify;
pub mod depth;
pub mod errors;
pub mod http_server;
pub mod upload;

pub use classify::{classify_handler, ClassifyResponse};
pub use depth::{depth_handler, DepthRasterResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, serve, start_server, AppState, HealthResponse};
pub use upload::{read_upload, Upload, UPLOAD_FIELD};
