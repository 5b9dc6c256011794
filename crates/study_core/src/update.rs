use std::time::Instant;

use study_logging::{study_debug, study_info, study_warn};

use crate::validation::validate_start;
use crate::{
    AppState, Effect, JobId, JobPhase, Msg, Phase, RemoteStatus, StatusUpdate, TimerKind,
    FALLBACK_JOB_ERROR,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TopicChanged(text) => {
            state.set_topic_input(text);
            Vec::new()
        }
        Msg::CredentialChanged(text) => {
            state.set_credential_input(text);
            Vec::new()
        }
        Msg::StartClicked { at } => start(&mut state, at),
        Msg::SubmitFinished { attempt, outcome } => submit_finished(&mut state, attempt, outcome),
        Msg::PollTick => poll_tick(&mut state),
        Msg::PollFinished { job_id, outcome } => poll_finished(&mut state, job_id, outcome),
        Msg::ElapsedTick { now } => {
            if state.timers().elapsed {
                state.tick_elapsed(now);
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            study_info!("Reset requested in phase {:?}", state.phase().kind());
            state.reset();
            // Unconditional: cancelling an inactive timer is a no-op downstream.
            TimerKind::ALL.into_iter().map(Effect::CancelTimer).collect()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut AppState, at: Instant) -> Vec<Effect> {
    match state.phase().kind() {
        Phase::Idle | Phase::Errored => {}
        phase => {
            study_debug!("Start ignored in phase {:?}", phase);
            return Vec::new();
        }
    }

    let request = match validate_start(state.topic_input(), state.credential_input()) {
        Ok(request) => request,
        Err(err) => {
            study_info!("Start rejected: {}", err);
            state.record_validation_error(err);
            return Vec::new();
        }
    };

    let mut effects = cancel_active_timers(state);
    let attempt = state.begin_submission(&request.topic, at);
    study_info!("Submitting attempt {} topic_len={}", attempt, request.topic.len());

    state.set_timer(TimerKind::Elapsed, true);
    effects.push(Effect::StartTimer(TimerKind::Elapsed));
    effects.push(Effect::SubmitJob { attempt, request });
    effects
}

fn submit_finished(
    state: &mut AppState,
    attempt: u64,
    outcome: Result<JobId, String>,
) -> Vec<Effect> {
    match state.phase() {
        JobPhase::Submitting { attempt: current, .. } if *current == attempt => {}
        phase => {
            study_debug!(
                "Discarding stale submit ack for attempt {} (phase {:?})",
                attempt,
                phase.kind()
            );
            return Vec::new();
        }
    }

    match outcome {
        Ok(job_id) => {
            study_info!("Job {} accepted; polling", job_id);
            state.enter_running(job_id);
            state.set_timer(TimerKind::Poll, true);
            vec![Effect::StartTimer(TimerKind::Poll)]
        }
        Err(message) => {
            study_warn!("Submission failed: {}", message);
            state.fail(message);
            cancel_active_timers(state)
        }
    }
}

fn poll_tick(state: &mut AppState) -> Vec<Effect> {
    let job_id = match state.phase() {
        JobPhase::Running { job_id, .. } if state.timers().poll => job_id.clone(),
        _ => return Vec::new(),
    };
    if state.poll_in_flight() {
        study_debug!("Poll for job {} still in flight; skipping tick", job_id);
        return Vec::new();
    }
    state.set_poll_in_flight(true);
    vec![Effect::PollStatus { job_id }]
}

fn poll_finished(
    state: &mut AppState,
    job_id: JobId,
    outcome: Result<StatusUpdate, String>,
) -> Vec<Effect> {
    let is_current = matches!(
        state.phase(),
        JobPhase::Running { job_id: current, .. } if *current == job_id
    );
    if !is_current {
        study_debug!("Discarding stale status for job {}", job_id);
        return Vec::new();
    }
    state.set_poll_in_flight(false);

    let status = match outcome {
        Ok(status) => status,
        Err(message) => {
            study_warn!("Transient poll failure for job {}: {}", job_id, message);
            state.record_poll_error(message);
            return Vec::new();
        }
    };

    match status.status {
        RemoteStatus::Completed => {
            study_info!("Job {} completed", job_id);
            state.apply_status(&status);
            let effects = cancel_active_timers(state);
            state.complete(status.result.unwrap_or_default());
            effects
        }
        RemoteStatus::Error => {
            let message = status
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_JOB_ERROR.to_string());
            study_warn!("Job {} failed: {}", job_id, message);
            let effects = cancel_active_timers(state);
            state.fail(message);
            effects
        }
        RemoteStatus::Running | RemoteStatus::Other(_) => {
            state.apply_status(&status);
            Vec::new()
        }
    }
}

fn cancel_active_timers(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    for kind in TimerKind::ALL {
        if state.timers().is_active(kind) {
            state.set_timer(kind, false);
            effects.push(Effect::CancelTimer(kind));
        }
    }
    effects
}
