use std::collections::{HashMap, HashSet};

use tracker_logging::tracker_debug;

use crate::{Job, JobId, Provenance, TrackedJob};

/// Counts of what a batch merge did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub inserted: usize,
    pub replaced: usize,
    pub rejected: usize,
}

enum Merge {
    Inserted,
    Replaced,
    Rejected,
}

/// Local mapping of job id to the latest known record, plus the ids the user
/// no longer wants to see.
///
/// `order` holds every id in `records` exactly once, most recently learned
/// first. Records are only ever written whole; nothing here mutates a field of
/// a stored `Job` in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registry {
    order: Vec<JobId>,
    records: HashMap<JobId, TrackedJob>,
    dismissed: HashSet<JobId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, job_id: &str) -> Option<&TrackedJob> {
        self.records.get(job_id)
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.records.contains_key(job_id)
    }

    pub fn is_dismissed(&self, job_id: &str) -> bool {
        self.dismissed.contains(job_id)
    }

    /// Replace or insert server records. New ids go to the front.
    pub fn upsert_many<I>(&mut self, jobs: I) -> MergeReport
    where
        I: IntoIterator<Item = Job>,
    {
        let mut report = MergeReport::default();
        for job in jobs {
            match self.merge_server_record(job) {
                Merge::Inserted => report.inserted += 1,
                Merge::Replaced => report.replaced += 1,
                Merge::Rejected => report.rejected += 1,
            }
        }
        report
    }

    /// Insert a local placeholder unless the id is already tracked.
    pub fn upsert_optimistic(&mut self, job: Job) -> bool {
        if self.records.contains_key(&job.id) {
            return false;
        }
        self.order.insert(0, job.id.clone());
        self.records.insert(
            job.id.clone(),
            TrackedJob {
                job,
                provenance: Provenance::Optimistic,
            },
        );
        true
    }

    /// Bring the registry in line with a full listing from the server.
    ///
    /// Every listed record is merged; ids missing from the listing survive only
    /// while still active. The resulting order is the server's, followed by the
    /// retained local-only ids.
    pub fn reconcile(&mut self, server_jobs: Vec<Job>) -> MergeReport {
        let server_ids: HashSet<JobId> = server_jobs.iter().map(|job| job.id.clone()).collect();

        let mut local_only = Vec::new();
        for id in &self.order {
            if server_ids.contains(id) {
                continue;
            }
            match self.records.get(id) {
                Some(tracked) if tracked.job.status.is_active() => local_only.push(id.clone()),
                Some(tracked) => {
                    tracker_debug!(
                        "reconcile dropped local-only job_id={} status={}",
                        id,
                        tracked.job.status
                    );
                }
                None => {}
            }
        }

        let mut order: Vec<JobId> = Vec::with_capacity(server_jobs.len() + local_only.len());
        for job in &server_jobs {
            if !order.contains(&job.id) {
                order.push(job.id.clone());
            }
        }
        order.extend(local_only);

        let report = self.upsert_many(server_jobs);
        self.records.retain(|id, _| order.contains(id));
        self.order = order;
        report
    }

    /// Hide a job from every view. The record itself is kept.
    pub fn dismiss(&mut self, job_id: &str) -> bool {
        self.dismissed.insert(job_id.to_owned())
    }

    /// Records that are not dismissed, most recent first.
    pub fn visible_jobs(&self) -> impl Iterator<Item = &TrackedJob> + '_ {
        self.order
            .iter()
            .filter(|id| !self.dismissed.contains(*id))
            .filter_map(|id| self.records.get(id))
    }

    pub fn active_jobs(&self) -> impl Iterator<Item = &TrackedJob> + '_ {
        self.visible_jobs()
            .filter(|tracked| tracked.job.status.is_active())
    }

    pub fn active_ids(&self) -> Vec<JobId> {
        self.active_jobs().map(|tracked| tracked.job.id.clone()).collect()
    }

    fn merge_server_record(&mut self, job: Job) -> Merge {
        match self.records.get_mut(&job.id) {
            Some(current) => {
                let held = current.job.status;
                if held.is_terminal() && job.status != held {
                    tracker_debug!(
                        "rejected status change job_id={} held={} incoming={}",
                        job.id,
                        held,
                        job.status
                    );
                    return Merge::Rejected;
                }
                *current = TrackedJob {
                    job,
                    provenance: Provenance::Server,
                };
                Merge::Replaced
            }
            None => {
                self.order.insert(0, job.id.clone());
                self.records.insert(
                    job.id.clone(),
                    TrackedJob {
                        job,
                        provenance: Provenance::Server,
                    },
                );
                Merge::Inserted
            }
        }
    }
}
