// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification response types

use serde::{Deserialize, Serialize};

use crate::vision::LabelScore;

/// Ranked land-cover predictions, serialized as a bare JSON array
///
/// ```json
/// [{"label": "urban", "score": 0.81}, {"label": "water", "score": 0.12}]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifyResponse(pub Vec<LabelScore>);

impl ClassifyResponse {
    pub fn predictions(&self) -> &[LabelScore] {
        &self.0
    }

    /// Highest-scoring label, if any
    pub fn top_label(&self) -> Option<&str> {
        self.0.first().map(|p| p.label.as_str())
    }
}

impl From<Vec<LabelScore>> for ClassifyResponse {
    fn from(predictions: Vec<LabelScore>) -> Self {
        Self(predictions)
    }
}
