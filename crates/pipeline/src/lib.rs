//! Comfort statistics runs.
//!
//! A run fetches every configured product for one region and time window,
//! converts it to physical units, reduces it to regional statistics, renders
//! a legend and map layer, optionally derives a comfort index, and submits
//! GeoTIFF and CSV export jobs.
//!
//! Configuration faults ([`PipelineError`]) stop a run before anything is
//! fetched. Missing imagery or a failing fetch only affects that product:
//! its statistics are reported unavailable and the summary row still gets
//! written.

pub mod config;
pub mod error;
pub mod outcome;
pub mod run;

pub use config::{ComfortConfig, ComfortInputs, ExportConfig, RegionConfig, RunConfig};
pub use error::{PipelineError, Result};
pub use outcome::{ProductOutcome, ProductReport};
pub use run::{Pipeline, RunReport, SubmittedJob};
