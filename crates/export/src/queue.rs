//! Job queue trait and job bookkeeping types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::job::ExportJob;

/// Receipt for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Job status for monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed { location: String },
    Failed { error: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }
}

/// Asynchronous export job system.
///
/// `submit` is fire-and-forget: it returns once the job is accepted, before
/// anything is written.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(&self, job: ExportJob) -> Result<JobHandle>;

    /// Last known status of a job, `None` for unknown ids.
    async fn status(&self, id: Uuid) -> Option<JobStatus>;
}
