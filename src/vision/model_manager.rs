// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading and sharing the CLIP and DPT models

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::vision::classifier::{ClipClassifier, ZeroShotClassifier};
use crate::vision::depth::{DepthEstimator, DptDepthEstimator};

/// Configuration for loading vision models
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// Path to the CLIP ONNX model directory (optional)
    pub clip_model_dir: Option<String>,
    /// Path to the DPT ONNX model directory (optional)
    pub depth_model_dir: Option<String>,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            clip_model_dir: Some("./models/clip-vit-base-patch32-onnx".to_string()),
            depth_model_dir: Some("./models/dpt-swinv2-tiny-256-onnx".to_string()),
            intra_threads: 4,
        }
    }
}

/// Information about a loaded vision model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionModelInfo {
    /// Model name
    pub name: String,
    /// Model type (classification, depth)
    pub model_type: String,
    /// Whether the model is available
    pub available: bool,
}

/// Holds the process-wide model handles
///
/// Models are loaded once at startup. A model that fails to load is logged
/// and left out; its endpoint then answers 503 instead of the whole service
/// refusing to start.
#[derive(Clone, Default)]
pub struct VisionModelManager {
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    depth_estimator: Option<Arc<dyn DepthEstimator>>,
}

impl VisionModelManager {
    /// Create a new VisionModelManager with the given configuration
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let classifier: Option<Arc<dyn ZeroShotClassifier>> =
            if let Some(ref dir) = config.clip_model_dir {
                match ClipClassifier::new(dir, config.intra_threads).await {
                    Ok(model) => {
                        tracing::info!("✅ CLIP classifier loaded from {}", dir);
                        Some(Arc::new(model))
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Failed to load CLIP model from {}: {:#}", dir, e);
                        None
                    }
                }
            } else {
                None
            };

        let depth_estimator: Option<Arc<dyn DepthEstimator>> =
            if let Some(ref dir) = config.depth_model_dir {
                match DptDepthEstimator::new(dir, config.intra_threads).await {
                    Ok(model) => {
                        tracing::info!("✅ DPT depth model loaded from {}", dir);
                        Some(Arc::new(model))
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Failed to load depth model from {}: {:#}", dir, e);
                        None
                    }
                }
            } else {
                None
            };

        Ok(Self {
            classifier,
            depth_estimator,
        })
    }

    /// Build a manager from already-constructed models
    pub fn from_models(
        classifier: Option<Arc<dyn ZeroShotClassifier>>,
        depth_estimator: Option<Arc<dyn DepthEstimator>>,
    ) -> Self {
        Self {
            classifier,
            depth_estimator,
        }
    }

    /// Get the classifier if available
    pub fn get_classifier(&self) -> Option<Arc<dyn ZeroShotClassifier>> {
        self.classifier.clone()
    }

    /// Get the depth estimator if available
    pub fn get_depth_estimator(&self) -> Option<Arc<dyn DepthEstimator>> {
        self.depth_estimator.clone()
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_depth(&self) -> bool {
        self.depth_estimator.is_some()
    }

    /// List all vision models and whether they loaded
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![
            VisionModelInfo {
                name: self
                    .classifier
                    .as_ref()
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| "clip-vit-base-patch32".to_string()),
                model_type: "classification".to_string(),
                available: self.classifier.is_some(),
            },
            VisionModelInfo {
                name: self
                    .depth_estimator
                    .as_ref()
                    .map(|d| d.name().to_string())
                    .unwrap_or_else(|| "dpt-swinv2-tiny-256".to_string()),
                model_type: "depth".to_string(),
                available: self.depth_estimator.is_some(),
            },
        ]
    }
}
