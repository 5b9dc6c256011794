use std::sync::Arc;
use std::time::Duration;

use study_core::{JobId, StartRequest, TimerKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{EngineEvent, JobBackend, TimerRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub tick_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            tick_interval: Duration::from_millis(1000),
        }
    }
}

impl EngineSettings {
    pub fn period(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::Poll => self.poll_interval,
            TimerKind::Elapsed => self.tick_interval,
        }
    }
}

/// Runs backend calls and timers on the ambient tokio runtime; results come
/// back as [`EngineEvent`]s on the receiver returned by [`EngineHandle::new`].
pub struct EngineHandle {
    backend: Arc<dyn JobBackend>,
    settings: EngineSettings,
    timers: TimerRegistry,
    event_tx: UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        settings: EngineSettings,
    ) -> (Self, UnboundedReceiver<EngineEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = Self {
            backend,
            settings,
            timers: TimerRegistry::new(event_tx.clone()),
            event_tx,
        };
        (handle, event_rx)
    }

    pub fn submit(&self, attempt: u64, request: StartRequest) {
        let backend = self.backend.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.start(&request).await;
            let _ = event_tx.send(EngineEvent::Submitted { attempt, result });
        });
    }

    pub fn poll(&self, job_id: JobId) {
        let backend = self.backend.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.status(&job_id).await;
            let _ = event_tx.send(EngineEvent::StatusReceived { job_id, result });
        });
    }

    pub fn start_timer(&mut self, kind: TimerKind) {
        self.timers.start(kind, self.settings.period(kind));
    }

    pub fn cancel_timer(&mut self, kind: TimerKind) {
        self.timers.cancel(kind);
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }
}
