//! Raster handling for regional product statistics.
//!
//! # Flow
//!
//! ```text
//! RasterFetcher::fetch(request)
//!      │
//!      ▼
//! RawRaster (catalog values + no-data mask)
//!      │
//!      ▼
//! convert(raw, descriptor)        value * scale + offset
//!      │
//!      ▼
//! RasterSample (physical units)
//!      │
//!      ├─► aggregate(sample, region, resolution, kinds) ─► StatisticsResult
//!      │
//!      └─► comfort_index(lst, ndvi, aod, weights)       ─► RasterSample
//! ```
//!
//! [`GeoTiffCatalog`] is a fetcher over a local directory of dated GeoTIFF
//! scenes; other catalogs plug in through the [`RasterFetcher`] trait.

pub mod aggregate;
pub mod catalog;
pub mod comfort;
pub mod composite;
pub mod convert;
pub mod downsample;
pub mod error;
pub mod fetcher;
pub mod geotiff;
pub mod types;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, coverage, Coverage, Resolution};
pub use catalog::GeoTiffCatalog;
pub use comfort::{comfort_index, normalize, ComfortWeights, COMFORT_PRODUCT};
pub use composite::mean_composite;
pub use convert::{convert, convert_value};
pub use downsample::{block_mean, integer_factor, resample_mean};
pub use error::{RasterError, Result};
pub use fetcher::{FetchRequest, RasterFetcher};
pub use geotiff::{read_geotiff, write_geotiff, GeoTiffImage};
pub use types::{PixelWindow, RasterGrid, RasterSample, RawRaster};
