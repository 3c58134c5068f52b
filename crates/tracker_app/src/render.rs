use chrono::{DateTime, Local};
use tracker_engine::{JobRowView, JobStatus, TrackerView};

const BAR_WIDTH: usize = 20;

/// Text rendering of the job panel, one entry per output line.
pub fn render(view: &TrackerView, now: DateTime<Local>) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.jobs.len() * 2 + 1);
    let polling = if view.polling { " (polling)" } else { "" };
    lines.push(format!(
        "[{}] Background jobs: {}{}",
        now.format("%H:%M:%S"),
        view.summary,
        polling
    ));

    for row in &view.jobs {
        lines.push(render_row(row));
        if let Some(percent) = row.progress_percent {
            lines.push(format!("      {}", progress_bar(percent)));
        }
    }
    lines
}

fn render_row(row: &JobRowView) -> String {
    let mut line = format!(
        "  {} {} [{}] {}",
        status_marker(row.status),
        row.title,
        row.job_id,
        row.detail
    );
    if row.cancelling {
        line.push_str(" (cancelling...)");
    }
    line
}

fn status_marker(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Completed => "[ok]",
        JobStatus::Failed => "[x] ",
        JobStatus::Cancelled => "[-] ",
        JobStatus::Processing => "[..]",
        JobStatus::Queued => "[  ]",
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tracker_engine::Provenance;

    fn row(job_id: &str, status: JobStatus, detail: &str, progress: Option<u8>) -> JobRowView {
        JobRowView {
            job_id: job_id.to_string(),
            title: "papers".to_string(),
            status,
            processed: 0,
            total_records: 0,
            failed: 0,
            error_sample: None,
            progress_percent: progress,
            detail: detail.to_string(),
            cancelling: false,
            provenance: Provenance::Server,
        }
    }

    #[test]
    fn renders_header_rows_and_progress() {
        let now = Local
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 5)
            .single()
            .expect("unambiguous time");
        let mut running = row("j1", JobStatus::Processing, "3 / 10 documents", Some(30));
        running.cancelling = true;
        let view = TrackerView {
            jobs: vec![running, row("j0", JobStatus::Completed, "Completed: 4 documents", None)],
            visible_count: 2,
            active_count: 1,
            polling: true,
            summary: "1 job running".to_string(),
        };

        let lines = render(&view, now);
        assert_eq!(
            lines,
            vec![
                "[09:30:05] Background jobs: 1 job running (polling)".to_string(),
                "  [..] papers [j1] 3 / 10 documents (cancelling...)".to_string(),
                "      [######--------------] 30%".to_string(),
                "  [ok] papers [j0] Completed: 4 documents".to_string(),
            ]
        );
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0), format!("[{}] 0%", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(BAR_WIDTH)));
    }
}
