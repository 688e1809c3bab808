//! Error types for raster handling.

use geo_common::GeoError;
use thiserror::Error;

/// Errors raised while converting, reducing, reading or writing rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Descriptor rejected before any pixel was touched.
    #[error(transparent)]
    InvalidDescriptor(#[from] GeoError),

    /// Sample resolution differs from the descriptor's native resolution.
    #[error("product '{product}': raster resolution {actual} m does not match native resolution {expected} m")]
    ResolutionMismatch {
        product: String,
        expected: f64,
        actual: f64,
    },

    /// Region and raster are in different CRSs.
    #[error("region CRS {region} does not match raster CRS {raster}")]
    CrsMismatch { region: String, raster: String },

    /// A resolution override that cannot be derived from the native grid.
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// Pixel buffers and grids that do not line up.
    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// Malformed or unsupported GeoTIFF content.
    #[error("GeoTIFF decode error: {0}")]
    Decode(String),

    /// Underlying TIFF codec error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Storage/IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RasterError {
    /// Create a GeometryMismatch error.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryMismatch(msg.into())
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an InvalidResolution error.
    pub fn invalid_resolution(msg: impl Into<String>) -> Self {
        Self::InvalidResolution(msg.into())
    }

    /// True for configuration faults that must abort a run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidDescriptor(_) | Self::InvalidResolution(_))
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
