//! Regional statistics over a converted raster.
//!
//! Every pixel is weighted by the fraction of its footprint that lies inside
//! the region. The mean is the weighted mean of valid pixels; min and max are
//! taken over every valid pixel with a non-zero weight. Overlaps within
//! [`EDGE_TOLERANCE`] of a cell count as zero. Pixels are visited in
//! row-major order with f64 accumulators, so identical inputs give
//! bit-identical results.

use geo_common::{RegionOfInterest, StatKind, StatisticsResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::downsample::{block_mean, integer_factor};
use crate::error::{RasterError, Result};
use crate::types::{RasterSample, EDGE_TOLERANCE};

/// Sampling scale used for the reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Use the sample's own resolution.
    #[default]
    Native,
    /// Reduce at a coarser scale, a whole multiple of the native one (meters).
    Override(f64),
}

/// How much of a region a sample covers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coverage {
    /// Pixels whose footprint overlaps the region.
    pub pixels_in_region: usize,
    /// Of those, pixels holding data.
    pub valid_pixels: usize,
    /// Fraction of the region's area covered by valid pixels (0.0 - 1.0).
    pub fraction: f64,
}

/// Compute the requested statistics of `sample` over `region`.
///
/// A region with no valid pixels gives an unavailable value for every
/// requested kind rather than an error.
pub fn aggregate(
    sample: &RasterSample,
    region: &RegionOfInterest,
    resolution: Resolution,
    kinds: &[StatKind],
) -> Result<StatisticsResult> {
    check_crs(sample, region)?;

    let scaled;
    let sample = match resolution {
        Resolution::Native => sample,
        Resolution::Override(target) => {
            let factor = integer_factor(sample.resolution_m(), target)?;
            scaled = block_mean(sample, factor)?;
            &scaled
        }
    };

    let grid = sample.grid();
    let mut weighted_sum = 0.0f64;
    let mut weight_total = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut contributing = 0usize;

    for (col, row, value) in sample.iter_valid() {
        let weight = grid.cell_bbox(col, row).overlap_fraction(&region.bbox);
        if weight <= EDGE_TOLERANCE {
            continue;
        }
        weighted_sum += weight * value;
        weight_total += weight;
        min = min.min(value);
        max = max.max(value);
        contributing += 1;
    }

    debug!(
        product = %sample.product(),
        region = %region.name,
        pixels = contributing,
        resolution_m = sample.resolution_m(),
        "Aggregated sample over region"
    );

    let mut result = StatisticsResult::unavailable(kinds);
    if contributing == 0 {
        return Ok(result);
    }

    for kind in kinds {
        let value = match kind {
            StatKind::Mean => weighted_sum / weight_total,
            StatKind::Min => min,
            StatKind::Max => max,
        };
        result.set(*kind, Some(value));
    }
    Ok(result)
}

/// Measure how much of `region` the valid pixels of `sample` cover.
pub fn coverage(sample: &RasterSample, region: &RegionOfInterest) -> Result<Coverage> {
    check_crs(sample, region)?;

    let grid = sample.grid();
    let region_area = region.bbox.area();
    let mut result = Coverage::default();
    let mut covered_area = 0.0f64;

    let Some(window) = grid.window(&region.bbox) else {
        return Ok(result);
    };

    for row in window.row..window.row + window.height {
        for col in window.col..window.col + window.width {
            let cell = grid.cell_bbox(col, row);
            let weight = cell.overlap_fraction(&region.bbox);
            if weight <= EDGE_TOLERANCE {
                continue;
            }
            result.pixels_in_region += 1;
            if sample.valid_mask()[row * grid.width + col] {
                result.valid_pixels += 1;
                covered_area += weight * cell.area();
            }
        }
    }

    if region_area > 0.0 {
        result.fraction = (covered_area / region_area).min(1.0);
    }
    Ok(result)
}

fn check_crs(sample: &RasterSample, region: &RegionOfInterest) -> Result<()> {
    if sample.grid().crs != region.crs {
        return Err(RasterError::CrsMismatch {
            region: region.crs.to_string(),
            raster: sample.grid().crs.to_string(),
        });
    }
    Ok(())
}
