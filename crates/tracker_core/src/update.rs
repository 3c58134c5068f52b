use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::{DismissVia, Effect, Job, JobId, Msg, StatusUpdate, TrackerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let mut effects = match msg {
        Msg::Started | Msg::RefreshRequested => vec![Effect::FetchJobList],
        Msg::RegisterRequested(job_id) => {
            if state.registry().contains(&job_id) {
                tracker_debug!("register ignored, already tracked job_id={}", job_id);
            } else {
                tracker_info!("registered job_id={}", job_id);
                state
                    .registry_mut()
                    .upsert_optimistic(Job::placeholder(job_id));
            }
            Vec::new()
        }
        Msg::DismissRequested(job_id) => request_dismiss(&mut state, job_id),
        Msg::PollTick => poll_tick(&mut state),
        Msg::StatusesFetched(updates) => {
            apply_statuses(&mut state, updates);
            Vec::new()
        }
        Msg::JobListFetched(Ok(jobs)) => {
            let report = state.registry_mut().reconcile(jobs);
            tracker_debug!(
                "reconciled inserted={} replaced={} rejected={}",
                report.inserted,
                report.replaced,
                report.rejected
            );
            Vec::new()
        }
        Msg::JobListFetched(Err(reason)) => {
            tracker_warn!("job list refresh failed, keeping last state: {}", reason);
            Vec::new()
        }
        Msg::CancelFinished { job_id, result } => settle_cancel(&mut state, job_id, result),
        Msg::DismissTimerFired(job_id) => {
            if state.registry().is_dismissed(&job_id) {
                Vec::new()
            } else {
                dismiss_now(&mut state, job_id, DismissVia::Expired)
            }
        }
        Msg::NoOp => return (state, Vec::new()),
    };

    supervise(&mut state, &mut effects);
    (state, effects)
}

fn request_dismiss(state: &mut TrackerState, job_id: JobId) -> Vec<Effect> {
    let active = !state.registry().is_dismissed(&job_id)
        && state
            .registry()
            .get(&job_id)
            .is_some_and(|tracked| tracked.job.status.is_active());
    if !active {
        return dismiss_now(state, job_id, DismissVia::Immediate);
    }

    if state.begin_cancel(&job_id) {
        tracker_info!("cancelling active job_id={}", job_id);
        vec![Effect::CancelJob { job_id }]
    } else {
        tracker_debug!("cancel already in flight job_id={}", job_id);
        Vec::new()
    }
}

fn dismiss_now(state: &mut TrackerState, job_id: JobId, via: DismissVia) -> Vec<Effect> {
    if !state.registry().is_dismissed(&job_id) {
        state.registry_mut().dismiss(&job_id);
        tracker_info!("dismissed job_id={} via={:?}", job_id, via);
    }
    vec![Effect::Dismissed { job_id, via }]
}

fn poll_tick(state: &mut TrackerState) -> Vec<Effect> {
    if !state.is_polling() {
        return Vec::new();
    }
    if state.is_poll_in_flight() {
        tracker_debug!("poll tick skipped, previous fetches outstanding");
        return Vec::new();
    }
    let job_ids = state.registry().active_ids();
    if job_ids.is_empty() {
        return Vec::new();
    }
    state.set_poll_in_flight(true);
    vec![Effect::FetchStatuses { job_ids }]
}

fn apply_statuses(state: &mut TrackerState, updates: Vec<StatusUpdate>) {
    state.set_poll_in_flight(false);

    let mut fresh = Vec::with_capacity(updates.len());
    for StatusUpdate { job_id, result } in updates {
        match result {
            Ok(job) if job.id == job_id && state.registry().contains(&job_id) => fresh.push(job),
            Ok(job) => {
                tracker_debug!(
                    "ignored status for untracked job_id={} (asked for {})",
                    job.id,
                    job_id
                );
            }
            Err(failure) => {
                tracker_debug!("status fetch failed job_id={}: {}", job_id, failure);
            }
        }
    }

    if !fresh.is_empty() {
        let report = state.registry_mut().upsert_many(fresh);
        tracker_debug!(
            "poll merged replaced={} rejected={}",
            report.replaced,
            report.rejected
        );
    }
}

fn settle_cancel(state: &mut TrackerState, job_id: JobId, result: Result<(), String>) -> Vec<Effect> {
    state.finish_cancel(&job_id);
    match result {
        Ok(()) => {
            let mut effects = vec![Effect::FetchJobList];
            effects.extend(dismiss_now(state, job_id, DismissVia::Cancelled));
            effects
        }
        Err(reason) => {
            let finished_meanwhile = state
                .registry()
                .get(&job_id)
                .map_or(true, |tracked| tracked.job.status.is_terminal());
            if finished_meanwhile {
                dismiss_now(state, job_id, DismissVia::Immediate)
            } else {
                tracker_warn!("cancel failed job_id={}: {}", job_id, reason);
                state.mark_dirty();
                vec![Effect::CancelFailed { job_id, reason }]
            }
        }
    }
}

/// Arms auto-dismiss timers for newly finished jobs and keeps the poller
/// running exactly while there is something active to poll.
fn supervise(state: &mut TrackerState, effects: &mut Vec<Effect>) {
    let newly_terminal: Vec<JobId> = state
        .registry()
        .visible_jobs()
        .filter(|tracked| tracked.job.status.is_terminal())
        .filter(|tracked| !state.has_seen_terminal(&tracked.job.id))
        .map(|tracked| tracked.job.id.clone())
        .collect();
    for job_id in newly_terminal {
        state.note_terminal(&job_id);
        effects.push(Effect::ScheduleDismiss { job_id });
    }

    let has_active = state.registry().active_jobs().next().is_some();
    if has_active && !state.is_polling() {
        tracker_info!("active jobs present, starting poller");
        state.set_polling(true);
        effects.push(Effect::StartPolling);
    } else if !has_active && state.is_polling() {
        tracker_info!("no active jobs left, stopping poller");
        state.set_polling(false);
        effects.push(Effect::StopPolling);
    }
}
