//! Linear rescaling of catalog values into physical units.

use geo_common::{GeoError, ProductDescriptor};
use tracing::debug;

use crate::error::{RasterError, Result};
use crate::types::{RawRaster, RasterSample};

/// Relative tolerance when comparing a raster's resolution with the native one.
const RESOLUTION_TOLERANCE: f64 = 1e-6;

/// Convert one catalog value: `raw * scale_factor + offset`.
pub fn convert_value(raw: f64, descriptor: &ProductDescriptor) -> Result<f64> {
    check_scale(descriptor)?;
    Ok(raw * descriptor.scale_factor + descriptor.offset)
}

/// Convert every pixel of a fetched raster, keeping its no-data mask.
///
/// Consumes the raw raster; the returned sample is in physical units and
/// carries the descriptor's product id.
pub fn convert(raw: RawRaster, descriptor: &ProductDescriptor) -> Result<RasterSample> {
    check_scale(descriptor)?;

    let native = descriptor.native_resolution_m;
    let actual = raw.grid().resolution_m;
    if (actual - native).abs() > native * RESOLUTION_TOLERANCE {
        return Err(RasterError::ResolutionMismatch {
            product: descriptor.id.clone(),
            expected: native,
            actual,
        });
    }

    let (grid, data, valid) = raw.into_parts();
    let scale = descriptor.scale_factor;
    let offset = descriptor.offset;

    let values = data
        .iter()
        .zip(&valid)
        .map(|(raw, ok)| {
            if *ok {
                f64::from(*raw) * scale + offset
            } else {
                f64::NAN
            }
        })
        .collect();

    debug!(
        product = %descriptor.id,
        width = grid.width,
        height = grid.height,
        scale = scale,
        offset = offset,
        "Converted raster to physical units"
    );

    Ok(RasterSample::from_parts(&descriptor.id, grid, values, valid))
}

fn check_scale(descriptor: &ProductDescriptor) -> Result<()> {
    if descriptor.scale_factor == 0.0 || !descriptor.scale_factor.is_finite() {
        return Err(GeoError::invalid_descriptor(
            &descriptor.id,
            format!(
                "scale factor must be finite and non-zero, got {}",
                descriptor.scale_factor
            ),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RasterGrid;
    use geo_common::{BoundingBox, CrsCode, Palette, PaletteStop, StatKind};

    fn descriptor(scale: f64, offset: f64) -> ProductDescriptor {
        ProductDescriptor {
            id: "lst".to_string(),
            name: String::new(),
            catalog_id: "MODIS/061/MOD11A1".to_string(),
            band: "LST_Day_1km".to_string(),
            scale_factor: scale,
            offset,
            native_resolution_m: 1000.0,
            units: None,
            palette: Palette::new(vec![
                PaletteStop::new(20.0, "blue"),
                PaletteStop::new(40.0, "red"),
            ]),
            statistics: vec![StatKind::Mean],
        }
    }

    fn raw(data: Vec<f32>, resolution_m: f64) -> RawRaster {
        let grid = RasterGrid::new(
            data.len(),
            1,
            BoundingBox::new(0.0, 0.0, data.len() as f64, 1.0),
            CrsCode::Epsg4326,
            resolution_m,
        )
        .unwrap();
        RawRaster::new(grid, data, Some(0.0)).unwrap()
    }

    #[test]
    fn test_convert_value() {
        let d = descriptor(0.02, -273.15);
        let v = convert_value(15000.0, &d).unwrap();
        assert!((v - 26.85).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scale_is_invalid_descriptor() {
        let d = descriptor(0.0, 1.0);
        assert!(matches!(
            convert_value(1.0, &d),
            Err(RasterError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            convert(raw(vec![1.0], 1000.0), &d),
            Err(RasterError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_mask_is_preserved() {
        let d = descriptor(0.02, -273.15);
        let sample = convert(raw(vec![15000.0, 0.0, 14000.0], 1000.0), &d).unwrap();
        assert_eq!(sample.product(), "lst");
        assert_eq!(sample.valid_mask(), &[true, false, true]);
        assert!((sample.get(0, 0).unwrap() - 26.85).abs() < 1e-9);
        assert_eq!(sample.get(1, 0), None);
        assert!(sample.values()[1].is_nan());
    }

    #[test]
    fn test_resolution_must_match_native() {
        let d = descriptor(0.02, -273.15);
        let err = convert(raw(vec![15000.0], 250.0), &d).unwrap_err();
        assert!(matches!(err, RasterError::ResolutionMismatch { .. }));
    }

    #[test]
    fn test_linearity() {
        let d = descriptor(0.0001, 0.0);
        for (a, b) in [(5000.0, 1000.0), (-2000.0, 9000.0), (0.0, 0.0)] {
            let diff = convert_value(a, &d).unwrap() - convert_value(b, &d).unwrap();
            assert!((diff - 0.0001 * (a - b)).abs() < 1e-12);
        }
    }
}
