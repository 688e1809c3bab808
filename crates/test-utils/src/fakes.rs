//! In-memory stand-ins for the raster catalog and the export job system.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use export::{ExportError, ExportJob, JobHandle, JobQueue, JobStatus};
use raster::{FetchRequest, RasterError, RasterFetcher, RawRaster};
use uuid::Uuid;

/// What [`StaticFetcher`] answers for one catalog band.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    Raster(RawRaster),
    Empty,
    Error(String),
}

/// Fetcher answering from a fixed table keyed by (catalog id, band).
///
/// Rasters are returned as given, without clipping. Unknown keys answer
/// empty. Every request is recorded.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<(String, String), CannedResponse>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raster(mut self, catalog_id: &str, band: &str, raw: RawRaster) -> Self {
        self.responses.insert(
            (catalog_id.to_string(), band.to_string()),
            CannedResponse::Raster(raw),
        );
        self
    }

    pub fn with_empty(mut self, catalog_id: &str, band: &str) -> Self {
        self.responses
            .insert((catalog_id.to_string(), band.to_string()), CannedResponse::Empty);
        self
    }

    pub fn with_error(mut self, catalog_id: &str, band: &str, message: &str) -> Self {
        self.responses.insert(
            (catalog_id.to_string(), band.to_string()),
            CannedResponse::Error(message.to_string()),
        );
        self
    }

    /// Requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[async_trait]
impl RasterFetcher for StaticFetcher {
    async fn fetch(&self, request: &FetchRequest) -> raster::Result<Option<RawRaster>> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        let key = (request.catalog_id.clone(), request.band.clone());
        match self.responses.get(&key) {
            Some(CannedResponse::Raster(raw)) => Ok(Some(raw.clone())),
            Some(CannedResponse::Error(message)) => {
                Err(RasterError::Io(std::io::Error::other(message.clone())))
            }
            Some(CannedResponse::Empty) | None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Job queue that records submissions and writes nothing.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    submitted: Mutex<Vec<(JobHandle, ExportJob)>>,
    reject: bool,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue refusing every submission.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// Jobs submitted so far, in submission order.
    pub fn jobs(&self) -> Vec<ExportJob> {
        self.submitted
            .lock()
            .expect("job log poisoned")
            .iter()
            .map(|(_, job)| job.clone())
            .collect()
    }

    pub fn handles(&self) -> Vec<JobHandle> {
        self.submitted
            .lock()
            .expect("job log poisoned")
            .iter()
            .map(|(handle, _)| handle.clone())
            .collect()
    }
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn submit(&self, job: ExportJob) -> export::Result<JobHandle> {
        if self.reject {
            return Err(ExportError::UnsupportedDestination(job.destination.to_string()));
        }
        let handle = JobHandle::new(&job.description);
        self.submitted
            .lock()
            .expect("job log poisoned")
            .push((handle.clone(), job));
        Ok(handle)
    }

    async fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.submitted
            .lock()
            .expect("job log poisoned")
            .iter()
            .any(|(handle, _)| handle.id == id)
            .then_some(JobStatus::Pending)
    }
}
