use study_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn ticks_without_a_job_are_noops() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::PollTick);
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(
        next,
        Msg::ElapsedTick {
            now: std::time::Instant::now(),
        },
    );
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
