//! Export jobs for run artifacts.
//!
//! Builders describe what to write ([`ExportJob`]); a [`JobQueue`] decides how
//! and when. [`LocalJobQueue`] writes GeoTIFF and CSV files to a directory in
//! background tasks.

pub mod builder;
pub mod error;
pub mod job;
pub mod local;
pub mod queue;
pub mod table;

pub use builder::{build_raster_export, build_table_export};
pub use error::{ExportError, Result};
pub use job::{Destination, ExportFormat, ExportJob, ExportParameters, ExportPayload};
pub use local::{DrainSummary, LocalJobQueue, GEOTIFF_NODATA};
pub use queue::{JobHandle, JobQueue, JobStatus};
pub use table::{FieldValue, ProductStatistics, TableRow};
