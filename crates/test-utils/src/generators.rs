//! Test data generators for synthetic catalog rasters.
//!
//! These generators create predictable, verifiable raster patterns that can
//! be used across the test suite.

use geo_common::ProductDescriptor;
use raster::{convert, RasterGrid, RasterSample, RawRaster};

/// Creates a grid with every cell set to `value`.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid where each cell is `start + step * index` (row-major).
///
/// ```
/// use test_utils::create_ramp_grid;
///
/// let grid = create_ramp_grid(3, 2, 10.0, 1.0);
/// assert_eq!(grid, vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
/// ```
pub fn create_ramp_grid(width: usize, height: usize, start: f32, step: f32) -> Vec<f32> {
    (0..width * height)
        .map(|i| start + step * i as f32)
        .collect()
}

/// Creates a grid with NaN values at specified (col, row) positions, `fill`
/// elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    fill: f32,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![fill; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Raw raster filled with one catalog value.
pub fn constant_raster(grid: &RasterGrid, value: f32) -> RawRaster {
    RawRaster::new(
        grid.clone(),
        create_constant_grid(grid.width, grid.height, value),
        None,
    )
    .expect("pixel count matches grid")
}

/// Raw raster with a row-major ramp of catalog values.
pub fn ramp_raster(grid: &RasterGrid, start: f32, step: f32) -> RawRaster {
    RawRaster::new(
        grid.clone(),
        create_ramp_grid(grid.width, grid.height, start, step),
        None,
    )
    .expect("pixel count matches grid")
}

/// Raw raster of `value` with no-data holes at the given positions.
pub fn raster_with_holes(grid: &RasterGrid, value: f32, holes: &[(usize, usize)]) -> RawRaster {
    RawRaster::new(
        grid.clone(),
        create_grid_with_nans(grid.width, grid.height, value, holes),
        None,
    )
    .expect("pixel count matches grid")
}

/// Raw raster where every pixel is no-data.
pub fn nodata_raster(grid: &RasterGrid) -> RawRaster {
    constant_raster(grid, f32::NAN)
}

/// Convert a raw raster with a descriptor, panicking on failure.
pub fn sample_for(descriptor: &ProductDescriptor, raw: RawRaster) -> RasterSample {
    convert(raw, descriptor)
        .unwrap_or_else(|e| panic!("cannot convert test raster for {}: {}", descriptor.id, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{kochi, km_grid, lst_descriptor};

    #[test]
    fn test_holes() {
        let grid = km_grid(&kochi());
        let raw = raster_with_holes(&grid, 15000.0, &[(0, 0), (3, 2), (99, 99)]);
        assert_eq!(raw.valid_count(), grid.len() - 2);
        assert_eq!(raw.get(0, 0), None);
        assert_eq!(raw.get(1, 0), Some(15000.0));
    }

    #[test]
    fn test_nodata_raster() {
        let grid = km_grid(&kochi());
        assert_eq!(nodata_raster(&grid).valid_count(), 0);
    }

    #[test]
    fn test_sample_for() {
        let grid = km_grid(&kochi());
        let sample = sample_for(&lst_descriptor(), constant_raster(&grid, 15000.0));
        assert!((sample.get(0, 0).unwrap() - 26.85).abs() < 1e-9);
    }
}
