//! Raster fetcher over a local directory of GeoTIFF scenes.
//!
//! Layout: `<root>/<catalog id, '/' replaced by '_'>/<band>/<YYYY-MM-DD>.tif`.
//! A fetch reads every scene dated inside the window, composites them with a
//! per-pixel mean and clips the result to the region. The catalog does not
//! resample: scenes are expected at the requested resolution and the result
//! is labelled with it.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use geo_common::TimeWindow;
use tracing::{debug, info, warn};

use crate::composite::mean_composite;
use crate::error::{RasterError, Result};
use crate::fetcher::{FetchRequest, RasterFetcher};
use crate::geotiff::read_geotiff;
use crate::types::RawRaster;

/// GeoTIFF directory catalog.
#[derive(Debug, Clone)]
pub struct GeoTiffCatalog {
    root: PathBuf,
}

impl GeoTiffCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the scenes of one band.
    pub fn band_dir(&self, catalog_id: &str, band: &str) -> PathBuf {
        self.root.join(catalog_id.replace('/', "_")).join(band)
    }

    /// Path a scene for `date` is stored at.
    pub fn scene_path(&self, catalog_id: &str, band: &str, date: NaiveDate) -> PathBuf {
        self.band_dir(catalog_id, band)
            .join(format!("{}.tif", date.format("%Y-%m-%d")))
    }

    /// Scenes dated inside `window`, oldest first.
    ///
    /// A missing band directory means the catalog has no imagery for it.
    pub fn scenes(
        &self,
        catalog_id: &str,
        band: &str,
        window: &TimeWindow,
    ) -> Result<Vec<(NaiveDate, PathBuf)>> {
        let dir = self.band_dir(catalog_id, band);
        if !dir.exists() {
            debug!(path = ?dir, "Band directory not found");
            return Ok(Vec::new());
        }

        let mut scenes = Vec::new();
        for entry in fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            let is_tiff = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("tif") | Some("tiff")
            );
            if !is_tiff {
                continue;
            }
            let Some(date) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                warn!(path = ?path, "Skipping scene without a YYYY-MM-DD name");
                continue;
            };
            if window.contains(date) {
                scenes.push((date, path));
            }
        }

        scenes.sort();
        Ok(scenes)
    }

    fn fetch_blocking(&self, request: &FetchRequest) -> Result<Option<RawRaster>> {
        let scenes = self.scenes(&request.catalog_id, &request.band, &request.window)?;
        if scenes.is_empty() {
            info!(
                catalog_id = %request.catalog_id,
                band = %request.band,
                window = %request.window,
                "No scenes in window"
            );
            return Ok(None);
        }

        let mut rasters: Vec<RawRaster> = Vec::with_capacity(scenes.len());
        for (date, path) in &scenes {
            let image = read_geotiff(path)?;
            if image.crs != request.region.crs {
                warn!(
                    path = ?path,
                    scene_crs = %image.crs,
                    region_crs = %request.region.crs,
                    "Skipping scene in a different CRS"
                );
                continue;
            }
            let raster = image.into_raw(request.resolution_m)?;
            if let Some(first) = rasters.first() {
                if !first.grid().same_geometry(raster.grid()) {
                    warn!(path = ?path, %date, "Skipping scene on a different grid");
                    continue;
                }
            }
            rasters.push(raster);
        }

        if rasters.is_empty() {
            return Ok(None);
        }

        let composite = mean_composite(&rasters)?;
        let clipped = composite.clip(&request.region.bbox);

        debug!(
            catalog_id = %request.catalog_id,
            band = %request.band,
            scenes = rasters.len(),
            overlaps_region = clipped.is_some(),
            "Composited scenes"
        );

        Ok(clipped)
    }
}

#[async_trait]
impl RasterFetcher for GeoTiffCatalog {
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<RawRaster>> {
        let catalog = self.clone();
        let request = request.clone();

        // Decoding is blocking file I/O
        tokio::task::spawn_blocking(move || catalog.fetch_blocking(&request))
            .await
            .map_err(|e| RasterError::Io(std::io::Error::other(e.to_string())))?
    }

    fn name(&self) -> &str {
        "geotiff-catalog"
    }
}
