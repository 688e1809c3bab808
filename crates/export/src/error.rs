//! Error types for export building and execution.

use raster::RasterError;
use thiserror::Error;

/// Errors raised while building or running export jobs.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A job that violates its own invariants (wrong resolution, duplicate columns, ...).
    #[error("invalid export job: {0}")]
    InvalidJob(String),

    /// The queue cannot write to this kind of destination.
    #[error("unsupported destination: {0}")]
    UnsupportedDestination(String),

    /// Writing a raster artifact failed.
    #[error("raster write failed: {0}")]
    Raster(#[from] RasterError),

    /// Writing a table artifact failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Storage/IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Background task panicked or was cancelled.
    #[error("export task failed: {0}")]
    Task(String),
}

impl ExportError {
    /// Create an InvalidJob error.
    pub fn invalid_job(msg: impl Into<String>) -> Self {
        Self::InvalidJob(msg.into())
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
