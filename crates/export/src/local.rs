//! Job queue writing artifacts to the local filesystem.
//!
//! Each submitted job runs in its own background task. Call
//! [`LocalJobQueue::drain`] before shutdown to wait for outstanding writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{ExportError, Result};
use crate::job::{Destination, ExportJob, ExportPayload};
use crate::queue::{JobHandle, JobQueue, JobStatus};
use crate::table::TableRow;

/// No-data value written into exported GeoTIFFs. NaN never collides with a
/// converted value.
pub const GEOTIFF_NODATA: f32 = f32::NAN;

/// Local filesystem job queue.
#[derive(Default)]
pub struct LocalJobQueue {
    statuses: Arc<RwLock<HashMap<Uuid, JobStatus>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Outcome counts from [`LocalJobQueue::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub completed: usize,
    pub failed: usize,
}

impl LocalJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every job submitted so far and report how they ended.
    pub async fn drain(&self) -> DrainSummary {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Export task aborted");
            }
        }

        let statuses = self.statuses.read().await;
        let mut summary = DrainSummary::default();
        for status in statuses.values() {
            match status {
                JobStatus::Completed { .. } => summary.completed += 1,
                JobStatus::Failed { .. } => summary.failed += 1,
                _ => {}
            }
        }
        summary
    }

    /// Forget completed and failed jobs, returning how many were removed.
    ///
    /// Pending and running jobs are kept.
    pub async fn prune_finished(&self) -> usize {
        let mut statuses = self.statuses.write().await;
        let before = statuses.len();
        statuses.retain(|_, status| !status.is_finished());
        let removed = before - statuses.len();
        debug!(removed, remaining = statuses.len(), "Pruned finished export jobs");
        removed
    }

    /// Statuses of every known job.
    pub async fn statuses(&self) -> HashMap<Uuid, JobStatus> {
        self.statuses.read().await.clone()
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn submit(&self, job: ExportJob) -> Result<JobHandle> {
        let dir = match &job.destination {
            Destination::Local { dir } => dir.clone(),
            other => return Err(ExportError::UnsupportedDestination(other.to_string())),
        };

        let handle = JobHandle::new(&job.description);
        let id = handle.id;
        self.statuses.write().await.insert(id, JobStatus::Pending);

        info!(
            job_id = %id,
            description = %job.description,
            format = %job.format,
            destination = %job.destination,
            "Submitted export job"
        );

        let statuses = Arc::clone(&self.statuses);
        let task = tokio::spawn(async move {
            statuses.write().await.insert(id, JobStatus::Running);

            let result = tokio::task::spawn_blocking(move || write_artifact(&dir, &job))
                .await
                .map_err(|e| ExportError::Task(e.to_string()))
                .and_then(|r| r);

            let status = match result {
                Ok(path) => {
                    info!(job_id = %id, path = ?path, "Export job completed");
                    JobStatus::Completed {
                        location: path.display().to_string(),
                    }
                }
                Err(e) => {
                    error!(job_id = %id, error = %e, "Export job failed");
                    JobStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            statuses.write().await.insert(id, status);
        });
        self.tasks.lock().await.push(task);

        Ok(handle)
    }

    async fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.statuses.read().await.get(&id).cloned()
    }
}

/// Write one job's artifact into `dir`, returning the file path.
pub fn write_artifact(dir: &Path, job: &ExportJob) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(job.file_name());

    match &job.payload {
        ExportPayload::Raster(sample) => {
            let data = sample.to_f32(GEOTIFF_NODATA);
            raster::write_geotiff(&path, sample.grid(), &data, GEOTIFF_NODATA)?;
        }
        ExportPayload::Table(row) => write_csv(&path, row)?,
    }

    debug!(path = ?path, format = %job.format, "Wrote artifact");
    Ok(path)
}

/// Header plus exactly one data row.
fn write_csv(path: &Path, row: &TableRow) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(row.header())?;
    writer.write_record(row.record())?;
    writer.flush()?;
    Ok(())
}
