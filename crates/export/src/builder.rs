//! Builders turning run results into export jobs.
//!
//! Builders are pure: the same inputs give jobs with identical parameters.

use std::sync::Arc;

use geo_common::{ProductDescriptor, RegionOfInterest, TimeWindow};
use raster::RasterSample;

use crate::error::{ExportError, Result};
use crate::job::{Destination, ExportFormat, ExportJob, ExportPayload};
use crate::table::{FieldValue, ProductStatistics, TableRow, DATE_FROM, DATE_TO, REGION};

/// GeoTIFF export of one product's sample at its native resolution and CRS.
pub fn build_raster_export(
    raster: Arc<RasterSample>,
    region: &RegionOfInterest,
    descriptor: &ProductDescriptor,
    destination: &Destination,
) -> Result<ExportJob> {
    if raster.product() != descriptor.id {
        return Err(ExportError::invalid_job(format!(
            "sample of '{}' exported with descriptor '{}'",
            raster.product(),
            descriptor.id
        )));
    }
    let native = descriptor.native_resolution_m;
    if (raster.resolution_m() - native).abs() > native * 1e-6 {
        return Err(ExportError::invalid_job(format!(
            "'{}' sample is at {} m, native resolution is {} m",
            descriptor.id,
            raster.resolution_m(),
            native
        )));
    }
    if raster.grid().crs != region.crs {
        return Err(ExportError::invalid_job(format!(
            "'{}' sample is in {}, region is in {}",
            descriptor.id,
            raster.grid().crs,
            region.crs
        )));
    }

    let name = format!("{}_{}", descriptor.id.to_uppercase(), region.slug());
    Ok(ExportJob {
        description: name.clone(),
        file_prefix: name,
        format: ExportFormat::GeoTiff,
        destination: destination.clone(),
        region: region.clone(),
        resolution_m: Some(native),
        crs: Some(region.crs),
        payload: ExportPayload::Raster(raster),
    })
}

/// CSV export of one summary row.
///
/// Columns are `date_from`, `date_to`, `region`, then every product's
/// statistics in the order given. Unavailable statistics become empty cells;
/// columns are never dropped.
pub fn build_table_export(
    stats_by_product: &[ProductStatistics],
    window: &TimeWindow,
    region: &RegionOfInterest,
    destination: &Destination,
) -> Result<ExportJob> {
    let mut row = TableRow::new();
    row.push(DATE_FROM, FieldValue::Text(window.date_from()));
    row.push(DATE_TO, FieldValue::Text(window.date_to()));
    row.push(REGION, FieldValue::Text(region.name.clone()));

    for stats in stats_by_product {
        for (column, value) in stats.fields() {
            if !row.push(column.clone(), value) {
                return Err(ExportError::invalid_job(format!(
                    "duplicate column '{}' in summary row",
                    column
                )));
            }
        }
    }

    let name = format!(
        "{}_stats_{}_{}",
        region.slug(),
        window.date_from(),
        window.date_to()
    );
    Ok(ExportJob {
        description: name.clone(),
        file_prefix: name,
        format: ExportFormat::Csv,
        destination: destination.clone(),
        region: region.clone(),
        resolution_m: None,
        crs: None,
        payload: ExportPayload::Table(row),
    })
}
