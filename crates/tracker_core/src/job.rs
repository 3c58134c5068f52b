use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned job identifier.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// `queued` and `processing` jobs are still running on the server.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// One ingestion run as reported by the job service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "job_id")]
    pub id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub error_sample: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Job {
    /// Placeholder shown between job submission and the first server answer.
    pub fn placeholder(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            collection_name: None,
            status: JobStatus::Queued,
            total_records: 0,
            processed: 0,
            failed: 0,
            error_sample: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Where the record currently held for a job came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Inserted locally right after submission; not yet confirmed.
    Optimistic,
    /// Last written from a job service response.
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedJob {
    pub job: Job,
    pub provenance: Provenance,
}

/// Why a status fetch for one job produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    NotFound,
    Unavailable(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::NotFound => write!(f, "job not found"),
            FetchFailure::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}
