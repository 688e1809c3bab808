//! Error types for shared domain types.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Configuration and validation errors for regions, windows and descriptors.
///
/// All of these are configuration faults: they are raised before any data is
/// fetched and abort the run.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid descriptor for product '{product}': {message}")]
    InvalidDescriptor { product: String, message: String },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Invalid bbox: {0}")]
    InvalidBbox(String),

    #[error("Invalid time window: {0}")]
    InvalidTime(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),
}

impl GeoError {
    /// Create an InvalidDescriptor error.
    pub fn invalid_descriptor(product: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            product: product.into(),
            message: message.into(),
        }
    }
}

impl From<crate::bbox::BboxParseError> for GeoError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        GeoError::InvalidBbox(err.to_string())
    }
}

impl From<crate::crs::CrsParseError> for GeoError {
    fn from(err: crate::crs::CrsParseError) -> Self {
        GeoError::InvalidCrs(err.to_string())
    }
}

impl From<crate::time::TimeParseError> for GeoError {
    fn from(err: crate::time::TimeParseError) -> Self {
        GeoError::InvalidTime(err.to_string())
    }
}
