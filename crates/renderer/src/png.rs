//! PNG encoding for RGBA pixel buffers.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, RgbaImage};

use crate::error::{RenderError, Result};

/// Encode a row-major RGBA8 buffer as PNG.
pub fn encode_rgba_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::dimensions(format!(
            "image must have at least one pixel, got {}x{}",
            width, height
        )));
    }
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(RenderError::dimensions(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }

    let image = RgbaImage::from_raw(width as u32, height as u32, pixels.to_vec())
        .ok_or_else(|| RenderError::dimensions("buffer does not fit image"))?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
