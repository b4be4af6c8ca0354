// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Zero-shot land-cover classification with CLIP
//!
//! Tiles are scored against a fixed vocabulary by cosine similarity between
//! the CLIP image embedding and pre-computed text embeddings of one prompt
//! per label. Scores are a softmax over the vocabulary, so they sum to one
//! across all labels before top-k truncation.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{Array1, Array2, ArrayViewD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::preprocessing::preprocess_for_clip;

/// Closed set of land-cover labels, in vocabulary order
pub const LAND_COVER_LABELS: [&str; 7] = [
    "urban", "forest", "desert", "water", "farmland", "ice", "mountain",
];

/// Prompt each label is embedded through
pub const HYPOTHESIS_TEMPLATE: &str = "This is a photo of {}.";

/// Default number of predictions returned per tile
pub const DEFAULT_TOP_K: usize = 3;

/// CLIP's learned temperature (exp of logit_scale) for ViT-B/32
pub const CLIP_LOGIT_SCALE: f32 = 100.0;

/// One (label, confidence) prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Image classifier over a fixed label vocabulary
pub trait ZeroShotClassifier: Send + Sync {
    /// Model identifier reported by /health
    fn name(&self) -> &str;

    /// The label vocabulary scores are drawn from
    fn labels(&self) -> &[String];

    /// Return at most `top_k` predictions, highest score first
    fn classify(&self, image: &DynamicImage, top_k: usize) -> Result<Vec<LabelScore>>;
}

/// Render a label through [`HYPOTHESIS_TEMPLATE`]
pub fn hypothesis_for(label: &str) -> String {
    HYPOTHESIS_TEMPLATE.replace("{}", label)
}

/// Scale L2 to unit length; zero vectors are left untouched
pub fn l2_normalize(v: &mut Array1<f32>) {
    let norm = v.dot(v).sqrt();
    if norm > f32::EPSILON {
        v.mapv_inplace(|x| x / norm);
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        let uniform = 1.0 / logits.len().max(1) as f32;
        return vec![uniform; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Turn per-label cosine similarities into ranked predictions
///
/// `similarities[i]` belongs to `labels[i]`. Ties keep vocabulary order.
pub fn rank_labels(similarities: &[f32], labels: &[String], top_k: usize) -> Vec<LabelScore> {
    let logits: Vec<f32> = similarities.iter().map(|s| s * CLIP_LOGIT_SCALE).collect();
    let probs = softmax(&logits);

    let mut ranked: Vec<LabelScore> = labels
        .iter()
        .zip(probs)
        .map(|(label, score)| LabelScore {
            label: label.clone(),
            score,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);
    ranked
}

/// CLIP ViT-B/32 split into ONNX vision and text towers
///
/// Expected files in the model directory:
/// - vision_model.onnx (pixel_values -> image_embeds)
/// - text_model.onnx (input_ids[, attention_mask] -> text_embeds)
/// - tokenizer.json
pub struct ClipClassifier {
    vision: Arc<Mutex<Session>>,
    vision_input: String,
    labels: Vec<String>,
    /// Unit-length text embeddings, one row per label
    label_embeddings: Array2<f32>,
    model_dir: PathBuf,
}

impl std::fmt::Debug for ClipClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipClassifier")
            .field("model_dir", &self.model_dir)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl ClipClassifier {
    /// Load both towers and embed the land-cover vocabulary
    pub async fn new<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        Self::with_labels(model_dir, &LAND_COVER_LABELS, intra_threads).await
    }

    /// Load both towers and embed a custom vocabulary
    pub async fn with_labels<P: AsRef<Path>>(
        model_dir: P,
        labels: &[&str],
        intra_threads: usize,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        if !model_dir.exists() {
            anyhow::bail!("CLIP model directory not found: {}", model_dir.display());
        }
        if labels.is_empty() {
            anyhow::bail!("CLIP classifier needs at least one label");
        }

        info!("Loading CLIP models from {}", model_dir.display());

        let vision_path = model_dir.join("vision_model.onnx");
        let text_path = model_dir.join("text_model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let vision = load_session(&vision_path, intra_threads)?;
        let mut text = load_session(&text_path, intra_threads)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vision_input = vision
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let label_embeddings = embed_labels(&mut text, &tokenizer, &labels)?;

        info!(
            "✅ CLIP classifier ready ({} labels, {}D embeddings)",
            labels.len(),
            label_embeddings.ncols()
        );

        Ok(Self {
            vision: Arc::new(Mutex::new(vision)),
            vision_input,
            labels,
            label_embeddings,
            model_dir: model_dir.to_path_buf(),
        })
    }

    fn embed_image(&self, image: &DynamicImage) -> Result<Array1<f32>> {
        let pixels = preprocess_for_clip(image);

        let mut session = self
            .vision
            .lock()
            .map_err(|_| anyhow::anyhow!("CLIP vision session lock poisoned"))?;

        let input_value = Value::from_array(pixels).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.vision_input => input_value])
            .context("CLIP vision inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract image embedding")?;

        let mut embedding = first_row(&output)?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

impl ZeroShotClassifier for ClipClassifier {
    fn name(&self) -> &str {
        "clip-vit-base-patch32"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, image: &DynamicImage, top_k: usize) -> Result<Vec<LabelScore>> {
        let image_embedding = self.embed_image(image)?;

        if image_embedding.len() != self.label_embeddings.ncols() {
            anyhow::bail!(
                "Embedding size mismatch: image {} vs text {}",
                image_embedding.len(),
                self.label_embeddings.ncols()
            );
        }

        let similarities = self.label_embeddings.dot(&image_embedding).to_vec();
        debug!("CLIP similarities: {:?}", similarities);

        Ok(rank_labels(&similarities, &self.labels, top_k))
    }
}

/// Build a CPU-only ONNX session
pub(crate) fn load_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model not found: {}", model_path.display());
    }

    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!("Failed to load ONNX model from {}", model_path.display()))?;

    debug!(
        "Loaded {} - inputs: {:?}",
        model_path.display(),
        session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
    );

    Ok(session)
}

/// Embed each label's hypothesis with the text tower
fn embed_labels(text: &mut Session, tokenizer: &Tokenizer, labels: &[String]) -> Result<Array2<f32>> {
    let takes_mask = text.inputs.iter().any(|i| i.name == "attention_mask");
    let mut rows: Vec<Array1<f32>> = Vec::with_capacity(labels.len());

    for label in labels {
        let prompt = hypothesis_for(label);
        let encoding = tokenizer
            .encode(prompt.as_str(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed for '{}': {}", prompt, e))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let ids = Array2::from_shape_vec((1, ids.len()), ids)
            .context("Failed to create input_ids array")?;
        let mask = Array2::from_shape_vec((1, mask.len()), mask)
            .context("Failed to create attention_mask array")?;

        let run = if takes_mask {
            text.run(ort::inputs![
                "input_ids" => Value::from_array(ids)?,
                "attention_mask" => Value::from_array(mask)?
            ])
        } else {
            text.run(ort::inputs!["input_ids" => Value::from_array(ids)?])
        };
        let outputs = run.context("CLIP text inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract text embedding")?;

        let mut row = first_row(&output)?;
        l2_normalize(&mut row);
        debug!("Embedded label '{}' ({} dims)", label, row.len());
        rows.push(row);
    }

    let dim = rows[0].len();
    let mut matrix = Array2::zeros((rows.len(), dim));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            anyhow::bail!("Inconsistent text embedding size for '{}'", labels[i]);
        }
        matrix.row_mut(i).assign(row);
    }
    Ok(matrix)
}

/// Take the pooled embedding out of a `[1, D]` model output
fn first_row(output: &ArrayViewD<'_, f32>) -> Result<Array1<f32>> {
    let shape = output.shape();
    if shape.len() != 2 || shape[0] < 1 {
        anyhow::bail!("Unexpected embedding shape {:?}, expected [1, D]", shape);
    }
    Ok(output.iter().take(shape[1]).copied().collect())
}
