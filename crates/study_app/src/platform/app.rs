use std::sync::Arc;
use std::time::Instant;

use study_core::{
    update, validate_start, AppState, AppViewModel, Credential, Msg, Phase, ValidationError,
};
use study_engine::{EngineEvent, EngineSettings, JobBackend};
use study_logging::study_debug;
use tokio::sync::mpsc::UnboundedReceiver;

use super::effects::{map_event, EffectRunner};

/// Result of [`Coordinator::start`] for valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A submission was issued.
    Submitted,
    /// A job is running or its result is showing; nothing was sent.
    Ignored,
}

/// Runtime side of the job controller: owns the state, feeds engine events
/// back through `update`, and hands effects to the [`EffectRunner`].
///
/// Must be created and driven inside a tokio runtime.
pub struct Coordinator {
    state: AppState,
    runner: EffectRunner,
    events: UnboundedReceiver<EngineEvent>,
}

impl Coordinator {
    pub fn new(backend: Arc<dyn JobBackend>, settings: EngineSettings) -> Self {
        let (runner, events) = EffectRunner::new(backend, settings);
        Self {
            state: AppState::new(),
            runner,
            events,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Timer tasks the engine is actually running.
    pub fn active_timers(&self) -> usize {
        self.runner.active_timers()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.run(effects);
    }

    /// Fill the form and press start. Invalid input is reported to the caller
    /// and no request is issued. While a job is in flight or a result is
    /// showing the press is ignored; call [`Coordinator::reset`] first.
    pub fn start(
        &mut self,
        topic: &str,
        credential: &str,
    ) -> Result<StartOutcome, ValidationError> {
        self.dispatch(Msg::TopicChanged(topic.to_string()));
        self.dispatch(Msg::CredentialChanged(credential.to_string()));
        if !matches!(self.state.phase().kind(), Phase::Idle | Phase::Errored) {
            study_debug!("Start ignored in phase {:?}", self.state.phase().kind());
            return Ok(StartOutcome::Ignored);
        }
        let checked = validate_start(topic, &Credential::new(credential));
        self.dispatch(Msg::StartClicked { at: Instant::now() });
        checked.map(|_| StartOutcome::Submitted)
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    pub async fn next_event(&mut self) -> Option<Msg> {
        self.events.recv().await.map(map_event)
    }

    /// No job is in flight.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.state.phase().kind(),
            Phase::Idle | Phase::Completed | Phase::Errored
        )
    }

    /// Drive engine events until the job completes or fails. `on_change`
    /// sees each coalesced view between events.
    pub async fn run_until_settled<F>(&mut self, mut on_change: F) -> AppViewModel
    where
        F: FnMut(&AppViewModel),
    {
        while !self.is_settled() {
            let Some(msg) = self.next_event().await else {
                break;
            };
            self.dispatch(msg);
            if self.state.consume_dirty() {
                on_change(&self.state.view());
            }
        }
        self.state.view()
    }
}
