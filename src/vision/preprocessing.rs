// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP and DPT encoders

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Target size for the CLIP ViT-B/32 vision tower
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std values
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Target size for DPT SwinV2-tiny
pub const DPT_INPUT_SIZE: u32 = 256;

pub const DPT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const DPT_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Preprocess an image for the CLIP vision encoder
///
/// Steps:
/// 1. Resize so the shortest edge is CLIP_INPUT_SIZE (bicubic)
/// 2. Center crop to CLIP_INPUT_SIZE x CLIP_INPUT_SIZE
/// 3. Normalize: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_clip(image: &DynamicImage) -> Array4<f32> {
    let cropped = shortest_edge_center_crop(image, CLIP_INPUT_SIZE);
    to_nchw_tensor(&cropped.to_rgb8(), &CLIP_MEAN, &CLIP_STD)
}

/// Preprocess an image for the DPT depth encoder
///
/// DPT is trained on a fixed square input, so the image is stretched
/// rather than cropped; the prediction is resized back afterwards.
pub fn preprocess_for_dpt(image: &DynamicImage) -> Array4<f32> {
    let resized = if image.width() == 0 || image.height() == 0 {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            DPT_INPUT_SIZE,
            DPT_INPUT_SIZE,
            Rgb([128, 128, 128]),
        ))
    } else {
        image.resize_exact(DPT_INPUT_SIZE, DPT_INPUT_SIZE, FilterType::CatmullRom)
    };
    to_nchw_tensor(&resized.to_rgb8(), &DPT_MEAN, &DPT_STD)
}

/// Resize keeping aspect ratio so the shorter edge equals `target_size`,
/// then crop the center square
pub fn shortest_edge_center_crop(image: &DynamicImage, target_size: u32) -> DynamicImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return DynamicImage::ImageRgb8(RgbImage::from_pixel(
            target_size,
            target_size,
            Rgb([128, 128, 128]),
        ));
    }

    let (new_w, new_h) = shortest_edge_dims(orig_w, orig_h, target_size);
    let resized = image.resize_exact(new_w, new_h, FilterType::CatmullRom);

    let crop_x = (new_w - target_size) / 2;
    let crop_y = (new_h - target_size) / 2;

    resized.crop_imm(crop_x, crop_y, target_size, target_size)
}

/// Output size of a shortest-edge resize; the long edge is truncated, not rounded
pub fn shortest_edge_dims(width: u32, height: u32, target_size: u32) -> (u32, u32) {
    let long_edge = |long: u32, short: u32| {
        ((target_size as u64 * long as u64 / short as u64) as u32).max(target_size)
    };

    if width <= height {
        (target_size, long_edge(height, width))
    } else {
        (long_edge(width, height), target_size)
    }
}

/// Convert an RGB image into a normalized [1, 3, H, W] tensor
pub fn to_nchw_tensor(rgb: &RgbImage, mean: &[f32; 3], std: &[f32; 3]) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }

    tensor
}
