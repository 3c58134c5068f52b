//! Tracker core: pure job registry, state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod registry;
mod state;
mod update;
mod view_model;

pub use effect::{DismissVia, Effect};
pub use job::{FetchFailure, Job, JobId, JobStatus, Provenance, TrackedJob};
pub use msg::{Msg, StatusUpdate};
pub use registry::{MergeReport, Registry};
pub use state::TrackerState;
pub use update::update;
pub use view_model::{JobRowView, TrackerView, DEFAULT_JOB_TITLE};
