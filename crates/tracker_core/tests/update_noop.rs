use tracker_core::{update, Msg, TrackerState};

#[test]
fn update_is_noop() {
    let state = TrackerState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stale_poll_tick_without_polling_does_nothing() {
    let state = TrackerState::new();
    let (next, effects) = update(state.clone(), Msg::PollTick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
