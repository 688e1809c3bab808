//! Thermal comfort index from temperature, vegetation and aerosol rasters.
//!
//! Each input is min-max normalized over its valid pixels, then combined as
//! `w_lst * (1 - lst) + w_ndvi * ndvi + w_aod * (1 - aod)`. Cooler, greener
//! and cleaner pixels score higher.

use geo_common::GeoError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::downsample::resample_mean;
use crate::error::Result;
use crate::types::{RasterGrid, RasterSample};

/// Product id given to comfort rasters and table columns.
pub const COMFORT_PRODUCT: &str = "comfort";

/// Ranges narrower than this normalize to zero.
const FLAT_RANGE: f64 = 1e-6;

/// Weights of the three comfort terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortWeights {
    #[serde(default = "default_lst_weight")]
    pub lst: f64,
    #[serde(default = "default_ndvi_weight")]
    pub ndvi: f64,
    #[serde(default = "default_aod_weight")]
    pub aod: f64,
}

fn default_lst_weight() -> f64 {
    0.5
}

fn default_ndvi_weight() -> f64 {
    0.3
}

fn default_aod_weight() -> f64 {
    0.2
}

impl Default for ComfortWeights {
    fn default() -> Self {
        Self {
            lst: default_lst_weight(),
            ndvi: default_ndvi_weight(),
            aod: default_aod_weight(),
        }
    }
}

impl ComfortWeights {
    pub fn validate(&self) -> Result<()> {
        let weights = [self.lst, self.ndvi, self.aod];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GeoError::invalid_descriptor(
                COMFORT_PRODUCT,
                format!("weights must be finite and non-negative, got {:?}", weights),
            )
            .into());
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(
                GeoError::invalid_descriptor(COMFORT_PRODUCT, "weights sum to zero").into(),
            );
        }
        Ok(())
    }
}

/// Rescale valid pixels to 0..1 by the sample's own min and max.
///
/// A flat sample normalizes to all zeros. The mask is unchanged.
pub fn normalize(sample: &RasterSample) -> RasterSample {
    let (lo, hi) = sample.value_range().unwrap_or((0.0, 0.0));
    let range = hi - lo;

    let values = sample
        .values()
        .iter()
        .zip(sample.valid_mask())
        .map(|(v, valid)| match (*valid, range < FLAT_RANGE) {
            (false, _) => f64::NAN,
            (true, true) => 0.0,
            (true, false) => (v - lo) / range,
        })
        .collect();

    RasterSample::from_parts(
        sample.product(),
        sample.grid().clone(),
        values,
        sample.valid_mask().to_vec(),
    )
}

/// Combine the three inputs into a comfort raster.
///
/// The output uses the grid of the coarsest input. Other inputs are averaged
/// into its cells, whatever their clip extent. A pixel is no-data if any
/// input is.
pub fn comfort_index(
    lst: &RasterSample,
    ndvi: &RasterSample,
    aod: &RasterSample,
    weights: &ComfortWeights,
) -> Result<RasterSample> {
    weights.validate()?;

    let reference = [ndvi, aod].into_iter().fold(lst, |coarsest, input| {
        if input.resolution_m() > coarsest.resolution_m() {
            input
        } else {
            coarsest
        }
    });
    let grid = reference.grid().clone();
    let lst = align(lst, &grid)?;
    let ndvi = align(ndvi, &grid)?;
    let aod = align(aod, &grid)?;

    let (lst_n, ndvi_n, aod_n) = (normalize(&lst), normalize(&ndvi), normalize(&aod));
    let mut values = vec![f64::NAN; grid.len()];
    let mut valid = vec![false; grid.len()];
    for idx in 0..grid.len() {
        if lst_n.valid_mask()[idx] && ndvi_n.valid_mask()[idx] && aod_n.valid_mask()[idx] {
            values[idx] = weights.lst * (1.0 - lst_n.values()[idx])
                + weights.ndvi * ndvi_n.values()[idx]
                + weights.aod * (1.0 - aod_n.values()[idx]);
            valid[idx] = true;
        }
    }

    debug!(
        width = grid.width,
        height = grid.height,
        resolution_m = grid.resolution_m,
        "Computed comfort index"
    );

    Ok(RasterSample::from_parts(COMFORT_PRODUCT, grid, values, valid))
}

fn align(sample: &RasterSample, grid: &RasterGrid) -> Result<RasterSample> {
    if sample.grid().same_geometry(grid) {
        return Ok(sample.clone());
    }
    resample_mean(sample, grid)
}
