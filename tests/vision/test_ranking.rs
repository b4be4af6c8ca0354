// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Zero-shot ranking tests

use atlassynth::vision::classifier::{hypothesis_for, rank_labels, softmax};
use atlassynth::vision::LAND_COVER_LABELS;

fn vocabulary() -> Vec<String> {
    LAND_COVER_LABELS.iter().map(|l| l.to_string()).collect()
}

#[test]
fn test_vocabulary_is_fixed() {
    assert_eq!(
        LAND_COVER_LABELS,
        ["urban", "forest", "desert", "water", "farmland", "ice", "mountain"]
    );
}

#[test]
fn test_hypotheses() {
    assert_eq!(hypothesis_for("water"), "This is a photo of water.");
    assert_eq!(hypothesis_for("farmland"), "This is a photo of farmland.");
}

#[test]
fn test_top_k_ordering_and_bounds() {
    let similarities = [0.20, 0.26, 0.21, 0.24, 0.30, 0.19, 0.22];
    let ranked = rank_labels(&similarities, &vocabulary(), 3);

    let labels: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["farmland", "forest", "water"]);
    assert!(ranked.iter().all(|p| (0.0..=1.0).contains(&p.score)));
}

#[test]
fn test_top_k_larger_than_vocabulary() {
    let ranked = rank_labels(&[0.1; 7], &vocabulary(), 50);
    assert_eq!(ranked.len(), 7);
    // Equal scores keep vocabulary order
    assert_eq!(ranked[0].label, "urban");
    assert_eq!(ranked[6].label, "mountain");
}

#[test]
fn test_softmax_sums_to_one() {
    let probs = softmax(&[3.0, 1.0, 0.2, -5.0]);
    let total: f32 = probs.iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(probs[0] > probs[1]);
}
