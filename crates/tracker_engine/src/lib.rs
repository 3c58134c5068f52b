//! Tracker engine: job service IO and the runtime that executes core effects.
mod service;
mod tracker;
mod types;

pub use service::{HttpJobService, JobService, ServiceSettings};
pub use tracker::{TrackerHandle, TrackerSettings};
pub use types::{CancelReceipt, FailureKind, IndexJobRequest, ServiceError, TrackerError};
pub use tracker_core::{
    DismissVia, Job, JobId, JobRowView, JobStatus, Provenance, TrackerView,
};
