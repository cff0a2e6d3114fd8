use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::RemoteStatus;

/// Tracks the local lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<RemoteStatus> for JobStatus {
    fn from(status: RemoteStatus) -> Self {
        match status {
            RemoteStatus::Pending => JobStatus::Pending,
            RemoteStatus::Completed => JobStatus::Completed,
            RemoteStatus::Failed | RemoteStatus::Error => JobStatus::Failed,
            // Unrecognized statuses are still in-flight from our side.
            RemoteStatus::Processing | RemoteStatus::Unknown => JobStatus::Processing,
        }
    }
}

/// A single remote transformation job. Identity is immutable; only the
/// status changes as polling observes progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}

/// Configuration for the polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed wait between status queries, in milliseconds.
    pub interval_ms: u64,
    /// Maximum number of status queries before giving up.
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        // 60 polls at 2s each: a ~120s budget per job.
        Self {
            interval_ms: 2000,
            max_polls: 60,
        }
    }
}

/// Structured record produced after a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub job_id: String,
    pub effect_id: String,
    pub status: JobStatus,
    pub polls: u32,
    pub result_url: String,
    pub saved_to: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl GenerationRecord {
    /// Build a record from a finished job.
    pub fn new(job: &Job, effect_id: &str, polls: u32, result_url: &str) -> Self {
        let now = Utc::now();
        let duration = now - job.submitted_at;

        Self {
            job_id: job.id.clone(),
            effect_id: effect_id.to_string(),
            status: job.status,
            polls,
            result_url: result_url.to_string(),
            saved_to: None,
            submitted_at: job.submitted_at,
            completed_at: now,
            duration_ms: duration.num_milliseconds(),
        }
    }
}
