//! Temporal compositing of scenes sharing one grid.

use crate::error::{RasterError, Result};
use crate::types::RawRaster;

/// Per-pixel mean of the valid observations across `scenes`.
///
/// Every scene must share the first scene's geometry. A pixel with no valid
/// observation in any scene stays no-data.
pub fn mean_composite(scenes: &[RawRaster]) -> Result<RawRaster> {
    let first = scenes
        .first()
        .ok_or_else(|| RasterError::geometry("cannot composite zero scenes"))?;
    let grid = first.grid().clone();

    if let Some(idx) = scenes
        .iter()
        .position(|scene| !scene.grid().same_geometry(&grid))
    {
        return Err(RasterError::geometry(format!(
            "scene {} does not share the composite grid",
            idx
        )));
    }

    let n = grid.len();
    let mut sums = vec![0.0f64; n];
    let mut counts = vec![0u32; n];
    for scene in scenes {
        for (idx, (value, valid)) in scene.data().iter().zip(scene.valid_mask()).enumerate() {
            if *valid {
                sums[idx] += f64::from(*value);
                counts[idx] += 1;
            }
        }
    }

    let data = sums
        .iter()
        .zip(&counts)
        .map(|(sum, count)| {
            if *count > 0 {
                (sum / f64::from(*count)) as f32
            } else {
                f32::NAN
            }
        })
        .collect();
    let valid = counts.iter().map(|c| *c > 0).collect();

    RawRaster::with_mask(grid, data, valid)
}
