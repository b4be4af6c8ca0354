// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Depth postprocessing tests
//!
//! The raw DPT prediction is a 256x256 grid; it must come back on the
//! input's pixel grid, scaled to 0..=255 byte levels.

use atlassynth::raster::{decode_geotiff, encode_geotiff};
use atlassynth::vision::depth::postprocess_depth;
use ndarray::{Array2, Array3};

#[test]
fn test_output_matches_requested_size() {
    let prediction = Array3::from_shape_fn((1, 256, 256), |(_, y, x)| (x + y) as f32);

    for (w, h) in [(256, 256), (512, 512), (100, 300), (1, 1)] {
        let depth = postprocess_depth(&prediction.view().into_dyn(), w, h).unwrap();
        assert_eq!(depth.dimensions(), (w, h));
        assert_eq!(depth.values().len(), (w * h) as usize);
    }
}

#[test]
fn test_values_are_whole_byte_levels() {
    let prediction = Array3::from_shape_fn((1, 256, 256), |(_, y, _)| y as f32 * 3.7);
    let depth = postprocess_depth(&prediction.view().into_dyn(), 320, 240).unwrap();

    assert_eq!(depth.max_value(), Some(255.0));
    assert!(depth
        .values()
        .iter()
        .all(|v| (0.0..=255.0).contains(v) && v.fract() == 0.0));
}

#[test]
fn test_flat_or_negative_prediction_is_zero() {
    let flat = Array3::<f32>::zeros((1, 256, 256));
    let depth = postprocess_depth(&flat.view().into_dyn(), 64, 64).unwrap();
    assert!(depth.values().iter().all(|v| *v == 0.0));

    let negative = Array3::from_elem((1, 256, 256), -4.0f32);
    let depth = postprocess_depth(&negative.view().into_dyn(), 64, 64).unwrap();
    assert_eq!(depth.max_value(), Some(0.0));
}

#[test]
fn test_two_dimensional_prediction_accepted() {
    let prediction = Array2::from_shape_fn((256, 256), |(y, x)| (x * y) as f32);
    let depth = postprocess_depth(&prediction.view().into_dyn(), 256, 256).unwrap();
    assert_eq!(depth.get(255, 255), Some(255.0));
    assert_eq!(depth.get(0, 0), Some(0.0));
}

#[test]
fn test_rejects_batched_prediction() {
    let prediction = Array3::<f32>::ones((2, 256, 256));
    assert!(postprocess_depth(&prediction.view().into_dyn(), 64, 64).is_err());
}

#[test]
fn test_postprocessed_raster_survives_tiff_encoding() {
    let prediction = Array3::from_shape_fn((1, 256, 256), |(_, y, x)| (x * 2 + y) as f32);
    let depth = postprocess_depth(&prediction.view().into_dyn(), 300, 180).unwrap();

    let decoded = decode_geotiff(&encode_geotiff(&depth).unwrap()).unwrap();
    assert_eq!(decoded.dimensions(), (300, 180));
    assert_eq!(decoded.values(), depth.values());
}
