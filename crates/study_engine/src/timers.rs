use std::collections::HashMap;
use std::time::Duration;

use study_core::TimerKind;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

struct RunningTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RunningTimer {
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// At most one recurring task per [`TimerKind`].
///
/// Must be used from within a tokio runtime.
pub struct TimerRegistry {
    timers: HashMap<TimerKind, RunningTimer>,
    event_tx: UnboundedSender<EngineEvent>,
}

impl TimerRegistry {
    pub fn new(event_tx: UnboundedSender<EngineEvent>) -> Self {
        Self {
            timers: HashMap::new(),
            event_tx,
        }
    }

    /// Start `kind`, replacing any task already running for it. The first
    /// tick fires one full `period` after this call.
    pub fn start(&mut self, kind: TimerKind, period: Duration) {
        if self.cancel(kind) {
            study_logging::study_debug!("Timer {kind:?} restarted");
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticks.tick() => {
                        if tx.send(EngineEvent::TimerFired(kind)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.timers.insert(kind, RunningTimer { cancel, handle });
    }

    /// Returns whether a timer was running.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.timers.remove(&kind) {
            Some(timer) => {
                timer.stop();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.stop();
        }
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.timers
            .get(&kind)
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    pub fn active_count(&self) -> usize {
        self.timers
            .values()
            .filter(|timer| !timer.handle.is_finished())
            .count()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
