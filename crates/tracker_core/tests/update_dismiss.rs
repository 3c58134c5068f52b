use std::sync::Once;

use pretty_assertions::assert_eq;
use tracker_core::{update, DismissVia, Effect, Job, JobStatus, Msg, StatusUpdate, TrackerState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn job(id: &str, status: JobStatus) -> Job {
    Job {
        status,
        processed: 3,
        total_records: 10,
        ..Job::placeholder(id)
    }
}

fn processing(job_id: &str) -> TrackerState {
    let (state, _) = update(TrackerState::new(), Msg::RegisterRequested(job_id.to_string()));
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(
        state,
        Msg::StatusesFetched(vec![StatusUpdate {
            job_id: job_id.to_string(),
            result: Ok(job(job_id, JobStatus::Processing)),
        }]),
    );
    state
}

fn dismissed(job_id: &str, via: DismissVia) -> Effect {
    Effect::Dismissed {
        job_id: job_id.to_string(),
        via,
    }
}

#[test]
fn dismissing_an_active_job_requests_cancellation() {
    init_logging();
    let (state, effects) = update(processing("j1"), Msg::DismissRequested("j1".to_string()));

    assert_eq!(
        effects,
        vec![Effect::CancelJob {
            job_id: "j1".to_string()
        }]
    );
    assert!(state.is_cancelling("j1"));
    let row = state.view().job("j1").cloned().expect("still visible");
    assert!(row.cancelling);
    assert_eq!(row.status, JobStatus::Processing);
}

#[test]
fn repeated_dismiss_joins_outstanding_cancel() {
    init_logging();
    let (state, _) = update(processing("j1"), Msg::DismissRequested("j1".to_string()));
    let (state, effects) = update(state, Msg::DismissRequested("j1".to_string()));

    assert!(effects.is_empty());
    assert!(state.is_cancelling("j1"));
}

#[test]
fn successful_cancel_reconciles_then_hides_job() {
    init_logging();
    let (state, _) = update(processing("j1"), Msg::DismissRequested("j1".to_string()));
    let (state, effects) = update(
        state,
        Msg::CancelFinished {
            job_id: "j1".to_string(),
            result: Ok(()),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::FetchJobList,
            dismissed("j1", DismissVia::Cancelled),
            Effect::StopPolling,
        ]
    );
    let view = state.view();
    assert!(view.job("j1").is_none());
    assert_eq!(view.active_count, 0);
    assert!(!state.is_cancelling("j1"));
    // The record survives for late responses.
    assert!(state.registry().contains("j1"));
}

#[test]
fn failed_cancel_leaves_job_visible_and_polled() {
    init_logging();
    let (state, _) = update(processing("j1"), Msg::DismissRequested("j1".to_string()));
    let (state, effects) = update(
        state,
        Msg::CancelFinished {
            job_id: "j1".to_string(),
            result: Err("conflict".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::CancelFailed {
            job_id: "j1".to_string(),
            reason: "conflict".to_string(),
        }]
    );
    let row = state.view().job("j1").cloned().expect("still visible");
    assert_eq!(row.status, JobStatus::Processing);
    assert!(!row.cancelling);
    assert!(state.is_polling());

    // The user can retry.
    let (_state, effects) = update(state, Msg::DismissRequested("j1".to_string()));
    assert_eq!(
        effects,
        vec![Effect::CancelJob {
            job_id: "j1".to_string()
        }]
    );
}

#[test]
fn failed_cancel_on_job_that_finished_meanwhile_dismisses_it() {
    init_logging();
    let (state, _) = update(processing("j1"), Msg::DismissRequested("j1".to_string()));
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(
        state,
        Msg::StatusesFetched(vec![StatusUpdate {
            job_id: "j1".to_string(),
            result: Ok(job("j1", JobStatus::Completed)),
        }]),
    );
    let (state, effects) = update(
        state,
        Msg::CancelFinished {
            job_id: "j1".to_string(),
            result: Err("Job cannot be cancelled (status: completed)".to_string()),
        },
    );

    assert_eq!(effects, vec![dismissed("j1", DismissVia::Immediate)]);
    assert!(state.view().job("j1").is_none());
}

#[test]
fn terminal_job_is_dismissed_without_network_call() {
    init_logging();
    let (state, _) = update(
        TrackerState::new(),
        Msg::JobListFetched(Ok(vec![job("done", JobStatus::Completed)])),
    );
    let (state, effects) = update(state, Msg::DismissRequested("done".to_string()));

    assert_eq!(effects, vec![dismissed("done", DismissVia::Immediate)]);
    assert!(state.view().jobs.is_empty());

    // The timer armed on discovery finds nothing left to do.
    let (_state, effects) = update(state, Msg::DismissTimerFired("done".to_string()));
    assert!(effects.is_empty());
}

#[test]
fn dismissed_job_stays_hidden_whatever_its_status() {
    init_logging();
    let (state, _) = update(
        TrackerState::new(),
        Msg::DismissRequested("later".to_string()),
    );
    let (state, effects) = update(
        state,
        Msg::JobListFetched(Ok(vec![job("later", JobStatus::Processing)])),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.job("later").is_none());
    assert_eq!(view.active_count, 0);
    assert!(!state.is_polling());
    assert!(state.registry().contains("later"));
}
