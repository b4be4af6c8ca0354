// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Monocular depth estimation with DPT
//!
//! The network predicts relative inverse depth on a fixed 256x256 grid. The
//! prediction is resized back onto the input image and rescaled so its
//! maximum maps to 255, quantized to 8-bit levels, and returned as f32.

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::ArrayViewD;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::classifier::load_session;
use super::preprocessing::preprocess_for_dpt;
use crate::raster::DepthMap;

/// Largest value of the normalized depth scale
pub const DEPTH_SCALE_MAX: f32 = 255.0;

/// Margin kept below and above unit values during resampling
const HEADROOM_LOW: f32 = 0.25;

/// Single-image depth model
pub trait DepthEstimator: Send + Sync {
    /// Model identifier reported by /health
    fn name(&self) -> &str;

    /// Predict a depth raster with the same width and height as `image`
    fn estimate(&self, image: &DynamicImage) -> Result<DepthMap>;
}

/// Resize a raw prediction onto a `width x height` grid and rescale to 0..=255
///
/// `prediction` is `[h, w]` with any number of leading unit axes. A
/// prediction whose maximum is not positive yields an all-zero raster.
pub fn postprocess_depth(prediction: &ArrayViewD<'_, f32>, width: u32, height: u32) -> Result<DepthMap> {
    let shape = prediction.shape();
    if shape.len() < 2 || shape[..shape.len() - 2].iter().any(|&d| d != 1) {
        anyhow::bail!("Unexpected depth output shape {:?}, expected [1, H, W]", shape);
    }

    let pred_h = shape[shape.len() - 2] as u32;
    let pred_w = shape[shape.len() - 1] as u32;
    let raw: Vec<f32> = prediction.iter().copied().collect();

    let max = raw.iter().copied().filter(|v| v.is_finite()).fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Ok(DepthMap::filled(width, height, 0.0)?);
    }

    let unit: Vec<f32> = raw
        .iter()
        .map(|v| if v.is_finite() { (v / max).max(0.0) } else { 0.0 })
        .collect();

    let resized: Vec<f32> = if (pred_w, pred_h) == (width, height) {
        unit
    } else {
        resize_with_headroom(unit, pred_w, pred_h, width, height)?
    };

    let resized_max = resized.iter().copied().fold(0.0f32, f32::max);
    if resized_max <= 0.0 {
        return Ok(DepthMap::filled(width, height, 0.0)?);
    }

    let values: Vec<f32> = resized
        .into_iter()
        .map(|v| {
            // The peak always lands on 255
            let level = if v >= resized_max {
                DEPTH_SCALE_MAX
            } else {
                v * DEPTH_SCALE_MAX / resized_max
            };
            (level as u8) as f32
        })
        .collect();

    Ok(DepthMap::new(width, height, values)?)
}

/// Bicubic resize of unit-range values that keeps filter overshoot
///
/// The image crate clamps float samples to [0, 1] while resampling, so
/// values are squeezed into [HEADROOM_LOW, 1 - HEADROOM_LOW] first and
/// expanded again afterwards.
fn resize_with_headroom(
    unit: Vec<f32>,
    src_w: u32,
    src_h: u32,
    width: u32,
    height: u32,
) -> Result<Vec<f32>> {
    let span = 1.0 - 2.0 * HEADROOM_LOW;
    let squeezed: Vec<f32> = unit.into_iter().map(|v| HEADROOM_LOW + v * span).collect();

    let grid: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(src_w, src_h, squeezed)
        .ok_or_else(|| anyhow::anyhow!("Depth buffer does not match {}x{}", src_w, src_h))?;

    Ok(imageops::resize(&grid, width, height, FilterType::CatmullRom)
        .into_raw()
        .into_iter()
        .map(|s| ((s - HEADROOM_LOW) / span).max(0.0))
        .collect())
}

/// DPT SwinV2-tiny depth model exported to ONNX
///
/// Expected files in the model directory:
/// - model.onnx (pixel_values -> predicted_depth)
pub struct DptDepthEstimator {
    session: Arc<Mutex<Session>>,
    input_name: String,
    model_dir: PathBuf,
}

impl std::fmt::Debug for DptDepthEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DptDepthEstimator")
            .field("input_name", &self.input_name)
            .field("model_dir", &self.model_dir)
            .finish_non_exhaustive()
    }
}

impl DptDepthEstimator {
    pub async fn new<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        if !model_dir.exists() {
            anyhow::bail!("Depth model directory not found: {}", model_dir.display());
        }

        info!("Loading DPT depth model from {}", model_dir.display());

        let session = load_session(&model_dir.join("model.onnx"), intra_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        info!("✅ DPT depth estimator ready (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_dir: model_dir.to_path_buf(),
        })
    }
}

impl DepthEstimator for DptDepthEstimator {
    fn name(&self) -> &str {
        "dpt-swinv2-tiny-256"
    }

    fn estimate(&self, image: &DynamicImage) -> Result<DepthMap> {
        let pixels = preprocess_for_dpt(image);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("DPT session lock poisoned"))?;

        let input_value = Value::from_array(pixels).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("DPT inference failed")?;

        let prediction = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract predicted depth")?;
        debug!("DPT output shape: {:?}", prediction.shape());

        postprocess_depth(&prediction, image.width(), image.height())
    }
}
