//! Error types for configuration and runs.

use export::ExportError;
use geo_common::GeoError;
use raster::RasterError;
use renderer::RenderError;
use thiserror::Error;

/// Errors that stop a run.
///
/// Per-product fetch and reduction failures are not errors at this level;
/// they are reported through [`ProductOutcome`](crate::ProductOutcome).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Structurally invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Region, window or descriptor rejected by validation.
    #[error(transparent)]
    Invalid(#[from] GeoError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when a product descriptor was rejected.
    pub fn is_invalid_descriptor(&self) -> bool {
        matches!(
            self,
            Self::Invalid(GeoError::InvalidDescriptor { .. })
                | Self::Raster(RasterError::InvalidDescriptor(GeoError::InvalidDescriptor { .. }))
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
