use crate::{JobId, JobStatus, Provenance, TrackedJob};

/// Title shown for jobs without a collection name.
pub const DEFAULT_JOB_TITLE: &str = "Indexing";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerView {
    pub jobs: Vec<JobRowView>,
    pub visible_count: usize,
    pub active_count: usize,
    pub polling: bool,
    pub summary: String,
}

impl TrackerView {
    pub(crate) fn new(jobs: Vec<JobRowView>, polling: bool) -> Self {
        let visible_count = jobs.len();
        let active_count = jobs.iter().filter(|row| row.status.is_active()).count();
        let summary = if active_count > 0 {
            format!("{} running", pluralize(active_count as u64, "job"))
        } else {
            format!("{} complete", pluralize(visible_count as u64, "job"))
        };
        Self {
            jobs,
            visible_count,
            active_count,
            polling,
            summary,
        }
    }

    pub fn job(&self, job_id: &str) -> Option<&JobRowView> {
        self.jobs.iter().find(|row| row.job_id == job_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub processed: u64,
    pub total_records: u64,
    pub failed: u64,
    pub error_sample: Option<String>,
    /// Only set while the job is active.
    pub progress_percent: Option<u8>,
    pub detail: String,
    pub cancelling: bool,
    pub provenance: Provenance,
}

impl JobRowView {
    pub(crate) fn new(tracked: &TrackedJob, cancelling: bool) -> Self {
        let job = &tracked.job;
        let progress_percent = job
            .status
            .is_active()
            .then(|| progress_percent(job.processed, job.total_records));
        Self {
            job_id: job.id.clone(),
            title: job
                .collection_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
            status: job.status,
            processed: job.processed,
            total_records: job.total_records,
            failed: job.failed,
            error_sample: job.error_sample.clone(),
            progress_percent,
            detail: detail_line(tracked),
            cancelling,
            provenance: tracked.provenance,
        }
    }
}

fn progress_percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = processed.saturating_mul(100) / total;
    percent.min(100) as u8
}

fn detail_line(tracked: &TrackedJob) -> String {
    let job = &tracked.job;
    let total = if job.total_records == 0 {
        "?".to_string()
    } else {
        job.total_records.to_string()
    };
    match job.status {
        JobStatus::Completed => format!("Completed: {}", pluralize(job.processed, "document")),
        JobStatus::Failed => match job.error_sample.as_deref() {
            Some(sample) if !sample.is_empty() => format!("Failed: {sample}"),
            _ => "Failed".to_string(),
        },
        JobStatus::Cancelled => format!("Cancelled: {} / {} documents", job.processed, total),
        JobStatus::Queued | JobStatus::Processing => {
            let mut line = format!("{} / {} documents", job.processed, total);
            if job.failed > 0 {
                line.push_str(&format!(" ({} failed)", job.failed));
            }
            line
        }
    }
}

fn pluralize(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Job;

    fn row(job: Job) -> JobRowView {
        JobRowView::new(
            &TrackedJob {
                job,
                provenance: Provenance::Server,
            },
            false,
        )
    }

    #[test]
    fn progress_is_clamped_and_zero_without_total() {
        assert_eq!(progress_percent(3, 10), 30);
        assert_eq!(progress_percent(12, 10), 100);
        assert_eq!(progress_percent(5, 0), 0);
    }

    #[test]
    fn detail_lines_follow_status() {
        let active = row(Job {
            status: JobStatus::Processing,
            processed: 3,
            total_records: 10,
            failed: 1,
            ..Job::placeholder("a")
        });
        assert_eq!(active.detail, "3 / 10 documents (1 failed)");
        assert_eq!(active.progress_percent, Some(30));
        assert_eq!(active.title, DEFAULT_JOB_TITLE);

        let done = row(Job {
            status: JobStatus::Completed,
            processed: 1,
            ..Job::placeholder("b")
        });
        assert_eq!(done.detail, "Completed: 1 document");
        assert_eq!(done.progress_percent, None);

        let failed = row(Job {
            status: JobStatus::Failed,
            error_sample: Some("bad row".into()),
            ..Job::placeholder("c")
        });
        assert_eq!(failed.detail, "Failed: bad row");

        let cancelled = row(Job {
            status: JobStatus::Cancelled,
            processed: 4,
            collection_name: Some("docs".into()),
            ..Job::placeholder("d")
        });
        assert_eq!(cancelled.detail, "Cancelled: 4 / ? documents");
        assert_eq!(cancelled.title, "docs");
    }

    #[test]
    fn summary_prefers_running_count() {
        let view = TrackerView::new(
            vec![
                row(Job::placeholder("a")),
                row(Job {
                    status: JobStatus::Completed,
                    ..Job::placeholder("b")
                }),
            ],
            true,
        );
        assert_eq!(view.summary, "1 job running");

        let idle = TrackerView::new(Vec::new(), false);
        assert_eq!(idle.summary, "0 jobs complete");
    }
}
