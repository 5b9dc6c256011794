use crate::{JobId, StartRequest};

/// Recurring timers owned by the job controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Status poll, every 2000 ms by default.
    Poll,
    /// Elapsed-time refresh, every 1000 ms by default.
    Elapsed,
}

impl TimerKind {
    pub const ALL: [TimerKind; 2] = [TimerKind::Poll, TimerKind::Elapsed];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob { attempt: u64, request: StartRequest },
    PollStatus { job_id: JobId },
    StartTimer(TimerKind),
    CancelTimer(TimerKind),
}
