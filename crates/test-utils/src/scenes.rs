//! Helpers for populating GeoTIFF catalog directories.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use geo_common::ProductDescriptor;
use raster::{write_geotiff, GeoTiffCatalog, RawRaster};

/// No-data value used for test scenes.
pub const SCENE_NODATA: f32 = -3000.0;

/// Write `raw` as the scene of `descriptor` dated `date` under `root`.
pub fn write_scene(
    root: &Path,
    descriptor: &ProductDescriptor,
    date: NaiveDate,
    raw: &RawRaster,
) -> PathBuf {
    let catalog = GeoTiffCatalog::new(root);
    let path = catalog.scene_path(&descriptor.catalog_id, &descriptor.band, date);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create scene directory");
    }

    let data: Vec<f32> = raw
        .data()
        .iter()
        .zip(raw.valid_mask())
        .map(|(v, valid)| if *valid { *v } else { SCENE_NODATA })
        .collect();
    write_geotiff(&path, raw.grid(), &data, SCENE_NODATA).expect("write test scene");
    path
}
