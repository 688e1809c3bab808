//! Core raster types.
//!
//! A [`RawRaster`] is what a fetcher hands back: catalog pixel values plus a
//! validity mask. [`convert`](crate::convert::convert) consumes it and yields
//! a [`RasterSample`] in physical units. A `RasterSample` can only be built
//! inside this crate, so conversion happens exactly once per fetched raster.

use geo_common::{BoundingBox, CrsCode};
use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

/// Overlaps thinner than this fraction of a cell are float noise on a shared
/// edge and count as no overlap.
pub const EDGE_TOLERANCE: f64 = 1e-9;

/// Regular north-up pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Outer edges of the grid in `crs` units.
    pub bbox: BoundingBox,
    pub crs: CrsCode,
    /// Nominal ground sampling distance in meters.
    pub resolution_m: f64,
}

impl RasterGrid {
    pub fn new(
        width: usize,
        height: usize,
        bbox: BoundingBox,
        crs: CrsCode,
        resolution_m: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::geometry(format!(
                "grid must have at least one pixel, got {}x{}",
                width, height
            )));
        }
        if !bbox.is_valid() {
            return Err(RasterError::geometry(format!("invalid grid bbox {:?}", bbox)));
        }
        if !(resolution_m > 0.0 && resolution_m.is_finite()) {
            return Err(RasterError::invalid_resolution(format!(
                "grid resolution must be positive, got {}",
                resolution_m
            )));
        }
        Ok(Self {
            width,
            height,
            bbox,
            crs,
            resolution_m,
        })
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel size in CRS units (x, y).
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.bbox.width() / self.width as f64,
            self.bbox.height() / self.height as f64,
        )
    }

    /// Footprint of one pixel. Row 0 is the northern edge.
    pub fn cell_bbox(&self, col: usize, row: usize) -> BoundingBox {
        let (dx, dy) = self.cell_size();
        let min_x = self.bbox.min_x + col as f64 * dx;
        let max_y = self.bbox.max_y - row as f64 * dy;
        BoundingBox::new(min_x, max_y - dy, min_x + dx, max_y)
    }

    /// Center of one pixel.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let (dx, dy) = self.cell_size();
        (
            self.bbox.min_x + (col as f64 + 0.5) * dx,
            self.bbox.max_y - (row as f64 + 0.5) * dy,
        )
    }

    /// Whether two grids describe the same pixels (same shape, CRS and edges).
    pub fn same_geometry(&self, other: &RasterGrid) -> bool {
        if self.width != other.width || self.height != other.height || self.crs != other.crs {
            return false;
        }
        let (dx, dy) = self.cell_size();
        let tol_x = dx * 1e-6;
        let tol_y = dy * 1e-6;
        (self.bbox.min_x - other.bbox.min_x).abs() <= tol_x
            && (self.bbox.max_x - other.bbox.max_x).abs() <= tol_x
            && (self.bbox.min_y - other.bbox.min_y).abs() <= tol_y
            && (self.bbox.max_y - other.bbox.max_y).abs() <= tol_y
    }

    /// Pixel window covering every cell that overlaps `bbox`.
    ///
    /// Edges within [`EDGE_TOLERANCE`] of a cell boundary snap to it, so a
    /// bbox ending on a boundary does not pull in the next cell.
    pub fn window(&self, bbox: &BoundingBox) -> Option<PixelWindow> {
        if !self.bbox.intersects(bbox) {
            return None;
        }
        let (dx, dy) = self.cell_size();

        let min_col = ((bbox.min_x - self.bbox.min_x) / dx + EDGE_TOLERANCE)
            .floor()
            .max(0.0) as usize;
        let max_col = ((bbox.max_x - self.bbox.min_x) / dx - EDGE_TOLERANCE)
            .ceil()
            .min(self.width as f64)
            .max(0.0) as usize;
        let min_row = ((self.bbox.max_y - bbox.max_y) / dy + EDGE_TOLERANCE)
            .floor()
            .max(0.0) as usize;
        let max_row = ((self.bbox.max_y - bbox.min_y) / dy - EDGE_TOLERANCE)
            .ceil()
            .min(self.height as f64)
            .max(0.0) as usize;

        if max_col <= min_col || max_row <= min_row {
            return None;
        }

        Some(PixelWindow {
            col: min_col,
            row: min_row,
            width: max_col - min_col,
            height: max_row - min_row,
        })
    }

    /// Grid of a window of this grid.
    pub fn subgrid(&self, window: &PixelWindow) -> RasterGrid {
        let (dx, dy) = self.cell_size();
        let min_x = self.bbox.min_x + window.col as f64 * dx;
        let max_y = self.bbox.max_y - window.row as f64 * dy;
        RasterGrid {
            width: window.width,
            height: window.height,
            bbox: BoundingBox::new(
                min_x,
                max_y - window.height as f64 * dy,
                min_x + window.width as f64 * dx,
                max_y,
            ),
            crs: self.crs,
            resolution_m: self.resolution_m,
        }
    }
}

/// Rectangular block of pixels inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

/// Catalog pixel values as fetched, before unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRaster {
    grid: RasterGrid,
    data: Vec<f32>,
    valid: Vec<bool>,
}

impl RawRaster {
    /// Build from pixel values, masking NaN and the optional no-data value.
    pub fn new(grid: RasterGrid, data: Vec<f32>, nodata: Option<f32>) -> Result<Self> {
        let valid = data
            .iter()
            .map(|v| !v.is_nan() && nodata.map_or(true, |nd| *v != nd))
            .collect();
        Self::with_mask(grid, data, valid)
    }

    /// Build from pixel values and an explicit validity mask.
    pub fn with_mask(grid: RasterGrid, data: Vec<f32>, valid: Vec<bool>) -> Result<Self> {
        if data.len() != grid.len() || valid.len() != grid.len() {
            return Err(RasterError::geometry(format!(
                "expected {} pixels for a {}x{} grid, got {} values and {} mask entries",
                grid.len(),
                grid.width,
                grid.height,
                data.len(),
                valid.len()
            )));
        }
        Ok(Self { grid, data, valid })
    }

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn valid_mask(&self) -> &[bool] {
        &self.valid
    }

    /// Value at a pixel, `None` for no-data or out of range.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.grid.width || row >= self.grid.height {
            return None;
        }
        let idx = row * self.grid.width + col;
        self.valid[idx].then(|| self.data[idx])
    }

    /// Number of pixels holding data.
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    /// Relabel the nominal resolution, keeping the pixels.
    pub fn with_resolution(mut self, resolution_m: f64) -> Self {
        self.grid.resolution_m = resolution_m;
        self
    }

    /// Cut out the pixels overlapping `bbox`. `None` when nothing overlaps.
    pub fn clip(&self, bbox: &BoundingBox) -> Option<RawRaster> {
        let window = self.grid.window(bbox)?;
        let grid = self.grid.subgrid(&window);

        let mut data = Vec::with_capacity(window.width * window.height);
        let mut valid = Vec::with_capacity(window.width * window.height);
        for row in window.row..window.row + window.height {
            let start = row * self.grid.width + window.col;
            let end = start + window.width;
            data.extend_from_slice(&self.data[start..end]);
            valid.extend_from_slice(&self.valid[start..end]);
        }

        Some(RawRaster { grid, data, valid })
    }

    pub(crate) fn into_parts(self) -> (RasterGrid, Vec<f32>, Vec<bool>) {
        (self.grid, self.data, self.valid)
    }
}

/// Unit-converted raster for one product over one region and window.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSample {
    product: String,
    grid: RasterGrid,
    values: Vec<f64>,
    valid: Vec<bool>,
}

impl RasterSample {
    /// Callers guarantee `values.len() == valid.len() == grid.len()`.
    pub(crate) fn from_parts(
        product: impl Into<String>,
        grid: RasterGrid,
        values: Vec<f64>,
        valid: Vec<bool>,
    ) -> Self {
        debug_assert_eq!(values.len(), grid.len());
        debug_assert_eq!(valid.len(), grid.len());
        Self {
            product: product.into(),
            grid,
            values,
            valid,
        }
    }

    /// Id of the product this sample belongs to.
    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    pub fn resolution_m(&self) -> f64 {
        self.grid.resolution_m
    }

    /// Values in row-major order. No-data pixels hold NaN.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn valid_mask(&self) -> &[bool] {
        &self.valid
    }

    /// Value at a pixel, `None` for no-data or out of range.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.grid.width || row >= self.grid.height {
            return None;
        }
        let idx = row * self.grid.width + col;
        self.valid[idx].then(|| self.values[idx])
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    /// Valid pixels as (col, row, value), row-major.
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.grid.width;
        self.values
            .iter()
            .zip(&self.valid)
            .enumerate()
            .filter(|(_, (_, valid))| **valid)
            .map(move |(idx, (value, _))| (idx % width, idx / width, *value))
    }

    /// Smallest and largest valid value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.iter_valid().fold(None, |acc, (_, _, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Values as f32 with no-data pixels set to `nodata`, for export.
    pub fn to_f32(&self, nodata: f32) -> Vec<f32> {
        self.values
            .iter()
            .zip(&self.valid)
            .map(|(v, valid)| if *valid { *v as f32 } else { nodata })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_4x2() -> RasterGrid {
        RasterGrid::new(
            4,
            2,
            BoundingBox::new(0.0, 0.0, 4.0, 2.0),
            CrsCode::Epsg4326,
            1000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_validation() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(RasterGrid::new(0, 1, bbox, CrsCode::Epsg4326, 1.0).is_err());
        assert!(RasterGrid::new(1, 1, bbox, CrsCode::Epsg4326, 0.0).is_err());
        assert!(RasterGrid::new(
            1,
            1,
            BoundingBox::new(1.0, 0.0, 0.0, 1.0),
            CrsCode::Epsg4326,
            1.0
        )
        .is_err());
    }

    #[test]
    fn test_cell_geometry() {
        let grid = grid_4x2();
        assert_eq!(grid.cell_size(), (1.0, 1.0));
        assert_eq!(grid.cell_bbox(0, 0), BoundingBox::new(0.0, 1.0, 1.0, 2.0));
        assert_eq!(grid.cell_bbox(3, 1), BoundingBox::new(3.0, 0.0, 4.0, 1.0));
        assert_eq!(grid.cell_center(1, 1), (1.5, 0.5));
    }

    #[test]
    fn test_nodata_masking() {
        let raster = RawRaster::new(
            grid_4x2(),
            vec![1.0, -9999.0, f32::NAN, 4.0, 5.0, 6.0, 7.0, 8.0],
            Some(-9999.0),
        )
        .unwrap();
        assert_eq!(raster.valid_count(), 6);
        assert_eq!(raster.get(0, 0), Some(1.0));
        assert_eq!(raster.get(1, 0), None);
        assert_eq!(raster.get(2, 0), None);
        assert_eq!(raster.get(4, 0), None);
    }

    #[test]
    fn test_pixel_count_must_match() {
        assert!(RawRaster::new(grid_4x2(), vec![0.0; 7], None).is_err());
    }

    #[test]
    fn test_clip_includes_touched_cells() {
        let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let raster = RawRaster::new(grid_4x2(), data, None).unwrap();

        let clipped = raster
            .clip(&BoundingBox::new(1.5, 0.5, 2.5, 1.5))
            .unwrap();
        assert_eq!(clipped.grid().width, 2);
        assert_eq!(clipped.grid().height, 2);
        assert_eq!(clipped.grid().bbox, BoundingBox::new(1.0, 0.0, 3.0, 2.0));
        assert_eq!(clipped.data(), &[1.0, 2.0, 5.0, 6.0]);

        assert!(raster.clip(&BoundingBox::new(10.0, 10.0, 11.0, 11.0)).is_none());
    }

    #[test]
    fn test_clip_on_cell_boundaries() {
        // 0.01 degree cells; (76.40 - 76.0) / 0.01 is slightly above 40
        let grid = RasterGrid::new(
            60,
            40,
            BoundingBox::new(76.0, 9.8, 76.6, 10.2),
            CrsCode::Epsg4326,
            1000.0,
        )
        .unwrap();
        let raster = RawRaster::new(grid, vec![1.0; 2400], None).unwrap();

        let clipped = raster
            .clip(&BoundingBox::new(76.20, 9.85, 76.40, 10.10))
            .unwrap();
        assert_eq!(clipped.grid().width, 20);
        assert_eq!(clipped.grid().height, 25);
        assert!((clipped.grid().bbox.max_x - 76.40).abs() < 1e-9);
        assert!((clipped.grid().bbox.min_y - 9.85).abs() < 1e-9);
    }

    #[test]
    fn test_same_geometry() {
        let a = grid_4x2();
        let mut b = grid_4x2();
        assert!(a.same_geometry(&b));
        b.bbox.max_x = 4.5;
        assert!(!a.same_geometry(&b));
    }
}
