//! Export job descriptions.
//!
//! An [`ExportJob`] describes a pending write; it is built once at the end of
//! a run, handed to a [`JobQueue`](crate::JobQueue) and never mutated.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use geo_common::{CrsCode, RegionOfInterest};
use raster::RasterSample;
use serde::{Deserialize, Serialize};

use crate::table::TableRow;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "GeoTIFF")]
    GeoTiff,
    #[serde(rename = "CSV")]
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::GeoTiff => "tif",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::GeoTiff => f.write_str("GeoTIFF"),
            ExportFormat::Csv => f.write_str("CSV"),
        }
    }
}

/// Where an artifact is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Destination {
    /// A local directory.
    Local { dir: PathBuf },
    /// An object-storage bucket and key prefix.
    Bucket {
        bucket: String,
        #[serde(default)]
        prefix: String,
    },
}

impl Destination {
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Destination::Local { dir: dir.into() }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Local { dir } => write!(f, "{}", dir.display()),
            Destination::Bucket { bucket, prefix } if prefix.is_empty() => {
                write!(f, "bucket://{}", bucket)
            }
            Destination::Bucket { bucket, prefix } => write!(f, "bucket://{}/{}", bucket, prefix),
        }
    }
}

/// Data carried by a job.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    Raster(Arc<RasterSample>),
    Table(TableRow),
}

/// A pending write.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub description: String,
    /// File name without extension.
    pub file_prefix: String,
    pub format: ExportFormat,
    pub destination: Destination,
    /// Region the artifact covers.
    pub region: RegionOfInterest,
    /// Sampling resolution of raster artifacts, meters.
    pub resolution_m: Option<f64>,
    /// CRS of raster artifacts.
    pub crs: Option<CrsCode>,
    pub payload: ExportPayload,
}

/// Everything about a job except its pixel data, for comparing and logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportParameters {
    pub description: String,
    pub file_prefix: String,
    pub format: ExportFormat,
    pub destination: Destination,
    pub region: RegionOfInterest,
    pub resolution_m: Option<f64>,
    pub crs: Option<CrsCode>,
    /// Product of a raster job.
    pub product: Option<String>,
    /// Column names of a table job.
    pub columns: Option<Vec<String>>,
}

impl ExportJob {
    /// File name including extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_prefix, self.format.extension())
    }

    /// Product id for raster jobs.
    pub fn product(&self) -> Option<&str> {
        match &self.payload {
            ExportPayload::Raster(sample) => Some(sample.product()),
            ExportPayload::Table(_) => None,
        }
    }

    /// Summary row of a table job.
    pub fn table_row(&self) -> Option<&TableRow> {
        match &self.payload {
            ExportPayload::Table(row) => Some(row),
            ExportPayload::Raster(_) => None,
        }
    }

    pub fn parameters(&self) -> ExportParameters {
        let (product, columns) = match &self.payload {
            ExportPayload::Raster(sample) => (Some(sample.product().to_string()), None),
            ExportPayload::Table(row) => (
                None,
                Some(row.header().into_iter().map(String::from).collect()),
            ),
        };
        ExportParameters {
            description: self.description.clone(),
            file_prefix: self.file_prefix.clone(),
            format: self.format,
            destination: self.destination.clone(),
            region: self.region.clone(),
            resolution_m: self.resolution_m,
            crs: self.crs,
            product,
            columns,
        }
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the file prefix.
    pub fn with_file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.file_prefix = file_prefix.into();
        self
    }
}
