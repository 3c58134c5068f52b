use std::collections::HashSet;

use crate::view_model::{JobRowView, TrackerView};
use crate::{JobId, Registry};

/// Everything the tracker knows, owned by a single driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    registry: Registry,
    /// Ids that already had their auto-dismiss timer armed.
    terminal_seen: HashSet<JobId>,
    /// Ids with a cancel call in flight.
    cancelling: HashSet<JobId>,
    polling: bool,
    poll_in_flight: bool,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }

    pub fn is_cancelling(&self, job_id: &str) -> bool {
        self.cancelling.contains(job_id)
    }

    pub fn has_seen_terminal(&self, job_id: &str) -> bool {
        self.terminal_seen.contains(job_id)
    }

    pub fn view(&self) -> TrackerView {
        let jobs: Vec<JobRowView> = self
            .registry
            .visible_jobs()
            .map(|tracked| JobRowView::new(tracked, self.cancelling.contains(&tracked.job.id)))
            .collect();
        TrackerView::new(jobs, self.polling)
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        self.dirty = true;
        &mut self.registry
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_polling(&mut self, polling: bool) {
        if self.polling != polling {
            self.polling = polling;
            self.dirty = true;
        }
    }

    pub(crate) fn set_poll_in_flight(&mut self, in_flight: bool) {
        self.poll_in_flight = in_flight;
    }

    pub(crate) fn begin_cancel(&mut self, job_id: &str) -> bool {
        let inserted = self.cancelling.insert(job_id.to_owned());
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    pub(crate) fn finish_cancel(&mut self, job_id: &str) -> bool {
        let removed = self.cancelling.remove(job_id);
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Records `job_id` as seen terminal; false if it already was.
    pub(crate) fn note_terminal(&mut self, job_id: &str) -> bool {
        self.terminal_seen.insert(job_id.to_owned())
    }
}
