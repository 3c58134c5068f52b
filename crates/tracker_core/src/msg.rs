use crate::{FetchFailure, Job, JobId};

/// Result of one per-job status fetch within a poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub job_id: JobId,
    pub result: Result<Job, FetchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Tracker came up; triggers the eager reconcile.
    Started,
    /// A job was submitted and its id should be tracked right away.
    RegisterRequested(JobId),
    /// User asked to remove a job from view (cancels it when still active).
    DismissRequested(JobId),
    /// Manual or periodic request for a full reconcile.
    RefreshRequested,
    /// Active poller interval elapsed.
    PollTick,
    /// Full job listing arrived (or failed).
    JobListFetched(Result<Vec<Job>, String>),
    /// All status fetches of one poll tick finished.
    StatusesFetched(Vec<StatusUpdate>),
    /// Cancel call for a job settled.
    CancelFinished {
        job_id: JobId,
        result: Result<(), String>,
    },
    /// Auto-dismiss delay for a terminal job elapsed.
    DismissTimerFired(JobId),
    /// Fallback for placeholder wiring.
    NoOp,
}
