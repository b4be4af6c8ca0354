// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every option can be given as a flag or through its `ATLASSYNTH_*`
//! environment variable; a `.env` file is read at startup if present.

use clap::Parser;
use std::net::SocketAddr;

use crate::vision::{VisionModelConfig, DEFAULT_TOP_K, LAND_COVER_LABELS};

/// Default bind address of the HTTP service
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// AtlasSynth AI service
#[derive(Parser, Debug, Clone)]
#[command(name = "atlassynth-server")]
#[command(version)]
#[command(about = "Zero-shot tile classification and depth estimation over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "ATLASSYNTH_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Directory holding vision_model.onnx, text_model.onnx and tokenizer.json
    #[arg(
        long,
        env = "ATLASSYNTH_CLIP_MODEL_DIR",
        default_value = "./models/clip-vit-base-patch32-onnx"
    )]
    pub clip_model_dir: String,

    /// Directory holding the DPT model.onnx
    #[arg(
        long,
        env = "ATLASSYNTH_DEPTH_MODEL_DIR",
        default_value = "./models/dpt-swinv2-tiny-256-onnx"
    )]
    pub depth_model_dir: String,

    /// Number of labels returned by /classify
    #[arg(long, env = "ATLASSYNTH_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "ATLASSYNTH_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// ONNX Runtime intra-op threads per model session
    #[arg(long, env = "ATLASSYNTH_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8000))),
            clip_model_dir: "./models/clip-vit-base-patch32-onnx".to_string(),
            depth_model_dir: "./models/dpt-swinv2-tiny-256-onnx".to_string(),
            top_k: DEFAULT_TOP_K,
            max_upload_bytes: 10 * 1024 * 1024,
            intra_threads: 4,
        }
    }
}

impl ServerConfig {
    /// `top_k` limited to the size of the label vocabulary, and at least one
    pub fn effective_top_k(&self) -> usize {
        self.top_k.clamp(1, LAND_COVER_LABELS.len())
    }

    /// Model locations for the [`VisionModelManager`](crate::vision::VisionModelManager)
    pub fn vision_model_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            clip_model_dir: non_empty(&self.clip_model_dir),
            depth_model_dir: non_empty(&self.depth_model_dir),
            intra_threads: self.intra_threads.max(1),
        }
    }
}

/// An empty path disables the model
fn non_empty(dir: &str) -> Option<String> {
    let trimmed = dir.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
