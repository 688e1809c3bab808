//! Block downsampling for coarser sampling scales.
//!
//! Reduces a sample by an integer factor, averaging the valid pixels of each
//! `factor x factor` block. Edge blocks that run past the grid only average
//! the pixels they actually hold, so the output grid may extend slightly past
//! the input edges.
//!
//! [`resample_mean`] averages a finer sample into the cells of an arbitrary
//! coarser grid, for inputs clipped on different grids.

use crate::error::{RasterError, Result};
use crate::types::{RasterGrid, RasterSample};

/// Integer factor between two resolutions, if `target` is a whole multiple
/// of `native` (within a small tolerance).
pub fn integer_factor(native_m: f64, target_m: f64) -> Result<usize> {
    if !(target_m > 0.0 && target_m.is_finite()) {
        return Err(RasterError::invalid_resolution(format!(
            "resolution must be positive, got {}",
            target_m
        )));
    }
    let ratio = target_m / native_m;
    let factor = ratio.round();
    if factor < 1.0 || (ratio - factor).abs() > 1e-6 * ratio.max(1.0) {
        return Err(RasterError::invalid_resolution(format!(
            "{} m is not a whole multiple of the native {} m",
            target_m, native_m
        )));
    }
    Ok(factor as usize)
}

/// Downsample a sample by `factor`, producing block means of valid pixels.
///
/// A block with no valid pixels is no-data. Factor 1 returns a copy.
pub fn block_mean(sample: &RasterSample, factor: usize) -> Result<RasterSample> {
    if factor == 0 {
        return Err(RasterError::invalid_resolution(
            "downsample factor must be at least 1",
        ));
    }
    if factor == 1 {
        return Ok(sample.clone());
    }

    let src = sample.grid();
    let new_width = src.width.div_ceil(factor);
    let new_height = src.height.div_ceil(factor);
    let (dx, dy) = src.cell_size();

    let mut bbox = src.bbox;
    bbox.max_x = bbox.min_x + (new_width * factor) as f64 * dx;
    bbox.min_y = bbox.max_y - (new_height * factor) as f64 * dy;
    let grid = RasterGrid::new(
        new_width,
        new_height,
        bbox,
        src.crs,
        src.resolution_m * factor as f64,
    )?;

    let values = sample.values();
    let valid = sample.valid_mask();
    let mut out_values = vec![f64::NAN; new_width * new_height];
    let mut out_valid = vec![false; new_width * new_height];

    for out_y in 0..new_height {
        for out_x in 0..new_width {
            let mut sum = 0.0f64;
            let mut count = 0usize;

            let row_end = ((out_y + 1) * factor).min(src.height);
            let col_end = ((out_x + 1) * factor).min(src.width);
            for row in out_y * factor..row_end {
                for col in out_x * factor..col_end {
                    let idx = row * src.width + col;
                    if valid[idx] {
                        sum += values[idx];
                        count += 1;
                    }
                }
            }

            if count > 0 {
                let idx = out_y * new_width + out_x;
                out_values[idx] = sum / count as f64;
                out_valid[idx] = true;
            }
        }
    }

    Ok(RasterSample::from_parts(
        sample.product(),
        grid,
        out_values,
        out_valid,
    ))
}

/// Average the valid pixels of `sample` into the cells of `target`.
///
/// Each source pixel goes to the target cell holding its center; pixels
/// outside `target` are dropped. A target cell receiving no valid pixel is
/// no-data. The result carries `target` as its grid.
pub fn resample_mean(sample: &RasterSample, target: &RasterGrid) -> Result<RasterSample> {
    let src = sample.grid();
    if src.crs != target.crs {
        return Err(RasterError::geometry(format!(
            "cannot resample a {} grid onto a {} grid",
            src.crs, target.crs
        )));
    }

    let (dx, dy) = target.cell_size();
    let mut sums = vec![0.0f64; target.len()];
    let mut counts = vec![0usize; target.len()];

    for (col, row, value) in sample.iter_valid() {
        let (x, y) = src.cell_center(col, row);
        let target_col = ((x - target.bbox.min_x) / dx).floor();
        let target_row = ((target.bbox.max_y - y) / dy).floor();
        if target_col < 0.0
            || target_row < 0.0
            || target_col >= target.width as f64
            || target_row >= target.height as f64
        {
            continue;
        }
        let idx = target_row as usize * target.width + target_col as usize;
        sums[idx] += value;
        counts[idx] += 1;
    }

    let values = sums
        .iter()
        .zip(&counts)
        .map(|(sum, count)| if *count > 0 { sum / *count as f64 } else { f64::NAN })
        .collect();
    let valid = counts.iter().map(|count| *count > 0).collect();

    Ok(RasterSample::from_parts(
        sample.product(),
        target.clone(),
        values,
        valid,
    ))
}
