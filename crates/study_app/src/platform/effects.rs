use std::sync::Arc;
use std::time::Instant;

use study_core::{Effect, Msg, RemoteStatus, ResultPayload, StatusUpdate, TimerKind};
use study_engine::{EngineEvent, EngineHandle, EngineSettings, JobBackend, JobStatus, StatusResponse};
use study_logging::{study_debug, study_info, study_warn};
use tokio::sync::mpsc::UnboundedReceiver;

/// Carries out core effects through the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        settings: EngineSettings,
    ) -> (Self, UnboundedReceiver<EngineEvent>) {
        let (engine, events) = EngineHandle::new(backend, settings);
        (Self { engine }, events)
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { attempt, request } => {
                    study_info!(
                        "SubmitJob attempt={} topic_len={}",
                        attempt,
                        request.topic.chars().count()
                    );
                    self.engine.submit(attempt, request);
                }
                Effect::PollStatus { job_id } => {
                    study_debug!("PollStatus job_id={job_id}");
                    self.engine.poll(job_id);
                }
                Effect::StartTimer(kind) => self.engine.start_timer(kind),
                Effect::CancelTimer(kind) => self.engine.cancel_timer(kind),
            }
        }
    }

    pub fn active_timers(&self) -> usize {
        self.engine.active_timers()
    }
}

/// Translate an engine event into the message the core understands.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { attempt, result } => Msg::SubmitFinished {
            attempt,
            outcome: result.map_err(|err| {
                study_warn!("Submission attempt {attempt} failed: {err}");
                err.to_string()
            }),
        },
        EngineEvent::StatusReceived { job_id, result } => {
            let outcome = match result {
                Ok(response) => Ok(status_update(response)),
                Err(err) => {
                    study_warn!("Status poll for {job_id} failed: {err}");
                    Err(err.to_string())
                }
            };
            Msg::PollFinished { job_id, outcome }
        }
        EngineEvent::TimerFired(TimerKind::Poll) => Msg::PollTick,
        EngineEvent::TimerFired(TimerKind::Elapsed) => Msg::ElapsedTick {
            now: Instant::now(),
        },
    }
}

/// Missing snapshot fields become empty; a body without a status counts as running.
pub fn status_update(response: StatusResponse) -> StatusUpdate {
    let status = match response.status {
        Some(JobStatus::Running) | None => RemoteStatus::Running,
        Some(JobStatus::Completed) => RemoteStatus::Completed,
        Some(JobStatus::Error) => RemoteStatus::Error,
        Some(JobStatus::Other(raw)) => RemoteStatus::Other(raw),
    };
    StatusUpdate {
        status,
        progress: response.progress.unwrap_or(0),
        current_step: response.current_step.unwrap_or_default(),
        logs: response.logs.unwrap_or_default(),
        result: response.result.map(ResultPayload::from_value),
        error: response.error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use study_core::JobId;
    use study_engine::BackendError;

    fn response(value: serde_json::Value) -> StatusResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sparse_snapshot_fills_defaults() {
        let update = status_update(response(json!({ "status": "started" })));
        assert_eq!(update.status, RemoteStatus::Other("started".into()));
        assert_eq!(update.progress, 0);
        assert_eq!(update.current_step, "");
        assert!(update.logs.is_empty());
        assert_eq!(update.result, None);
    }

    #[test]
    fn completed_snapshot_carries_payload() {
        let update = status_update(response(json!({
            "status": "completed",
            "progress": 100,
            "result": { "topic_info": { "final_topic": "T" } }
        })));
        assert_eq!(update.status, RemoteStatus::Completed);
        let result = update.result.expect("payload");
        assert_eq!(
            result.topic_info.and_then(|info| info.final_topic).as_deref(),
            Some("T")
        );
    }

    #[test]
    fn backend_error_text_becomes_message() {
        let msg = map_event(EngineEvent::Submitted {
            attempt: 3,
            result: Err(BackendError::Server("model quota exceeded".into())),
        });
        assert_eq!(
            msg,
            Msg::SubmitFinished {
                attempt: 3,
                outcome: Err("model quota exceeded".into()),
            }
        );
    }

    #[test]
    fn poll_timer_maps_to_poll_tick() {
        assert_eq!(map_event(EngineEvent::TimerFired(TimerKind::Poll)), Msg::PollTick);
        let poll_failure = map_event(EngineEvent::StatusReceived {
            job_id: JobId::new("j"),
            result: Err(BackendError::Timeout),
        });
        assert!(matches!(
            poll_failure,
            Msg::PollFinished { outcome: Err(ref text), .. } if text == "request timed out"
        ));
    }
}
