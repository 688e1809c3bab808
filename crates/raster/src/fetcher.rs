//! Raster fetcher trait.

use async_trait::async_trait;
use geo_common::{ProductDescriptor, RegionOfInterest, TimeWindow};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::RawRaster;

/// What to fetch: one band of one collection over a region and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub catalog_id: String,
    pub band: String,
    pub region: RegionOfInterest,
    pub window: TimeWindow,
    /// Resolution the raster must be delivered at, in meters.
    pub resolution_m: f64,
}

impl FetchRequest {
    /// Request for a product at its native resolution.
    pub fn for_product(
        descriptor: &ProductDescriptor,
        region: &RegionOfInterest,
        window: TimeWindow,
    ) -> Self {
        Self {
            catalog_id: descriptor.catalog_id.clone(),
            band: descriptor.band.clone(),
            region: region.clone(),
            window,
            resolution_m: descriptor.native_resolution_m,
        }
    }
}

/// Source of catalog rasters.
///
/// Implementations return one raster clipped to the request's region at the
/// requested resolution, in the region's CRS. `Ok(None)` means the catalog
/// had no imagery for the request; that is a normal outcome, not an error.
#[async_trait]
pub trait RasterFetcher: Send + Sync {
    /// Fetch a raster for the request.
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<RawRaster>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
