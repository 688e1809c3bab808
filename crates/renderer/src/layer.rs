//! Colorized map layers.

use geo_common::ProductDescriptor;
use raster::RasterSample;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::png::encode_rgba_png;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// RGBA rendering of one sample, north-up, one image pixel per raster pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub product: String,
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA8.
    pub pixels: Vec<u8>,
}

impl MapLayer {
    /// Colorize `sample` through the descriptor palette.
    ///
    /// Values outside the display domain take the nearest end color.
    /// No-data pixels are fully transparent.
    pub fn render(sample: &RasterSample, descriptor: &ProductDescriptor) -> Result<Self> {
        if sample.product() != descriptor.id {
            return Err(RenderError::ProductMismatch {
                sample: sample.product().to_string(),
                descriptor: descriptor.id.clone(),
            });
        }
        descriptor
            .palette
            .validate()
            .map_err(|e| RenderError::invalid_palette(&descriptor.id, e.to_string()))?;

        let grid = sample.grid();
        let mut pixels = Vec::with_capacity(grid.len() * 4);
        for (value, valid) in sample.values().iter().zip(sample.valid_mask()) {
            let rgba = if *valid {
                descriptor
                    .palette
                    .interpolate(*value)
                    .map(|(r, g, b, a)| [r, g, b, a])
                    .unwrap_or(TRANSPARENT)
            } else {
                TRANSPARENT
            };
            pixels.extend_from_slice(&rgba);
        }

        debug!(
            product = %descriptor.id,
            width = grid.width,
            height = grid.height,
            valid = sample.valid_count(),
            "Rendered map layer"
        );

        Ok(Self {
            product: descriptor.id.clone(),
            width: grid.width,
            height: grid.height,
            pixels,
        })
    }

    /// RGBA at a pixel.
    pub fn pixel(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = (row * self.width + col) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_rgba_png(&self.pixels, self.width, self.height)
    }
}
