// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-band float rasters
//!
//! The depth endpoint returns its result as a one-band float32 TIFF, the
//! same container GDAL writes for a GTiff with `count=1, dtype=float32`.
//! No CRS or geotransform tags are written: the raster is addressed in
//! pixel coordinates only.

use std::io::Cursor;

use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

/// Media type of an encoded raster
pub const RASTER_CONTENT_TYPE: &str = "image/tiff";

/// File name the depth raster is delivered under
pub const RASTER_FILENAME: &str = "height.tif";

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Raster has {actual} values, expected {expected} ({width}x{height})")]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Raster must have non-zero dimensions, got {0}x{1}")]
    Empty(u32, u32),

    #[error("TIFF encoding failed: {0}")]
    Encode(#[from] tiff::TiffError),

    #[error("Unsupported raster sample type")]
    UnsupportedSampleType,
}

/// A row-major, single-channel float raster
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthMap {
    /// Build a raster, checking that `values` covers exactly `width * height` pixels
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty(width, height));
        }

        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(RasterError::ShapeMismatch {
                width,
                height,
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// A raster filled with a single value
    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self, RasterError> {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at pixel (x, y), if in bounds
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Largest finite value in the raster
    pub fn max_value(&self) -> Option<f32> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
    }
}

/// Encode a depth map as a single-band float32 TIFF, entirely in memory
pub fn encode_geotiff(depth: &DepthMap) -> Result<Vec<u8>, RasterError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor)?;
        encoder.write_image::<colortype::Gray32Float>(depth.width, depth.height, &depth.values)?;
    }
    Ok(cursor.into_inner())
}

/// Decode a single-band float32 TIFF produced by [`encode_geotiff`]
pub fn decode_geotiff(bytes: &[u8]) -> Result<DepthMap, RasterError> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;

    match decoder.read_image()? {
        DecodingResult::F32(values) => DepthMap::new(width, height, values),
        _ => Err(RasterError::UnsupportedSampleType),
    }
}
