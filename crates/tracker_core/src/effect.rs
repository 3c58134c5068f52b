use crate::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the full job listing for reconciliation.
    FetchJobList,
    /// Fetch fresh status for each id concurrently.
    FetchStatuses { job_ids: Vec<JobId> },
    /// Start the repeating poll task if it is not running.
    StartPolling,
    /// Cancel the repeating poll task.
    StopPolling,
    /// Ask the job service to cancel a running job.
    CancelJob { job_id: JobId },
    /// Arm the one-shot auto-dismiss timer.
    ScheduleDismiss { job_id: JobId },
    /// A dismissal took effect.
    Dismissed { job_id: JobId, via: DismissVia },
    /// A user cancel failed; the job stays visible.
    CancelFailed { job_id: JobId, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissVia {
    /// Job was already terminal (or unknown); no network call.
    Immediate,
    /// Job was cancelled on the server first.
    Cancelled,
    /// Auto-dismiss timer after the job finished.
    Expired,
}
