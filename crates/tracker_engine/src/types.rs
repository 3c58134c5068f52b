use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_core::{FetchFailure, JobId, JobStatus};

/// Answer to a successful cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelReceipt {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Body of a "start indexing" request. The field semantics belong to the
/// server; the tracker only forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexJobRequest {
    pub upload_id: String,
    pub collection_name: String,
    pub text_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    pub metadata_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Poll-side view of the error: only "not found" is told apart.
    pub fn to_fetch_failure(&self) -> FetchFailure {
        match self.kind {
            FailureKind::NotFound => FetchFailure::NotFound,
            _ => FetchFailure::Unavailable(self.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    NotFound,
    /// Server understood the request and refused it (e.g. job not cancellable).
    Rejected,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Rejected => write!(f, "rejected"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("could not cancel job {job_id}: {reason}")]
    CancelFailed { job_id: JobId, reason: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("job tracker is not running")]
    Stopped,
}
