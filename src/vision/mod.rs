// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for map tiles
//!
//! This module provides:
//! - Zero-shot land-cover classification via CLIP
//! - Monocular depth estimation via DPT
//!
//! Both run on CPU through ONNX Runtime.

pub mod classifier;
pub mod depth;
pub mod image_utils;
pub mod model_manager;
pub mod preprocessing;

pub use classifier::{
    ClipClassifier, LabelScore, ZeroShotClassifier, DEFAULT_TOP_K, LAND_COVER_LABELS,
};
pub use depth::{DepthEstimator, DptDepthEstimator};
pub use image_utils::{
    decode_image_bytes, decode_image_bytes_with_limit, detect_format, encode_png, ImageError,
    ImageInfo,
};
pub use model_manager::{VisionModelConfig, VisionModelInfo, VisionModelManager};
