use std::fmt;
use std::time::Instant;

use crate::payload::ResultPayload;
use crate::step::parse_step_index;
use crate::validation::{Credential, ValidationError};
use crate::TimerKind;

/// Shown when the backend reports an error without a message.
pub const FALLBACK_JOB_ERROR: &str = "분석 중 오류가 발생했습니다.";

/// Backend-assigned session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phase discriminant, for comparisons and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Running,
    Completed,
    Errored,
}

/// The job lifecycle. Data that only exists in one phase lives in that variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Submitting {
        attempt: u64,
        started_at: Instant,
    },
    Running {
        job_id: JobId,
        started_at: Instant,
    },
    Completed {
        job_id: JobId,
        result: Box<ResultPayload>,
    },
    Errored {
        message: String,
    },
}

impl JobPhase {
    pub fn kind(&self) -> Phase {
        match self {
            JobPhase::Idle => Phase::Idle,
            JobPhase::Submitting { .. } => Phase::Submitting,
            JobPhase::Running { .. } => Phase::Running,
            JobPhase::Completed { .. } => Phase::Completed,
            JobPhase::Errored { .. } => Phase::Errored,
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            JobPhase::Running { job_id, .. } | JobPhase::Completed { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    fn started_at(&self) -> Option<Instant> {
        match self {
            JobPhase::Submitting { started_at, .. } | JobPhase::Running { started_at, .. } => {
                Some(*started_at)
            }
            _ => None,
        }
    }
}

/// Which recurring timers the controller has asked the platform to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveTimers {
    pub poll: bool,
    pub elapsed: bool,
}

impl ActiveTimers {
    pub fn is_active(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Poll => self.poll,
            TimerKind::Elapsed => self.elapsed,
        }
    }

    pub fn count(&self) -> usize {
        usize::from(self.poll) + usize::from(self.elapsed)
    }

    fn set(&mut self, kind: TimerKind, active: bool) {
        match kind {
            TimerKind::Poll => self.poll = active,
            TimerKind::Elapsed => self.elapsed = active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Running,
    Completed,
    Error,
    /// Any other status string (the backend reports "started" before step 1).
    Other(String),
}

/// One status poll response, already decoded by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: RemoteStatus,
    pub progress: u32,
    pub current_step: String,
    pub logs: Vec<String>,
    pub result: Option<ResultPayload>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    topic_input: String,
    credential_input: Credential,
    validation_error: Option<ValidationError>,
    phase: JobPhase,
    submitted_topic: Option<String>,
    progress: u32,
    current_step: String,
    step_index: u32,
    logs: Vec<String>,
    elapsed_secs: u64,
    last_poll_error: Option<String>,
    poll_in_flight: bool,
    timers: ActiveTimers,
    attempts: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    pub fn topic_input(&self) -> &str {
        &self.topic_input
    }

    pub fn credential_input(&self) -> &Credential {
        &self.credential_input
    }

    pub fn validation_error(&self) -> Option<ValidationError> {
        self.validation_error
    }

    pub fn submitted_topic(&self) -> Option<&str> {
        self.submitted_topic.as_deref()
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn last_poll_error(&self) -> Option<&str> {
        self.last_poll_error.as_deref()
    }

    pub fn poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }

    pub fn timers(&self) -> ActiveTimers {
        self.timers
    }

    pub fn active_timer_count(&self) -> usize {
        self.timers.count()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_topic_input(&mut self, text: String) {
        if self.topic_input != text {
            self.topic_input = text;
            self.validation_error = None;
            self.dirty = true;
        }
    }

    pub(crate) fn set_credential_input(&mut self, text: String) {
        let credential = Credential::new(text);
        if self.credential_input != credential {
            self.credential_input = credential;
            self.validation_error = None;
            self.dirty = true;
        }
    }

    pub(crate) fn record_validation_error(&mut self, err: ValidationError) {
        self.validation_error = Some(err);
        self.dirty = true;
    }

    pub(crate) fn set_timer(&mut self, kind: TimerKind, active: bool) {
        self.timers.set(kind, active);
    }

    /// Clear the previous job and enter `Submitting`. Returns the new attempt number.
    pub(crate) fn begin_submission(&mut self, topic: &str, at: Instant) -> u64 {
        self.clear_job();
        self.validation_error = None;
        self.attempts += 1;
        self.submitted_topic = Some(topic.to_string());
        self.phase = JobPhase::Submitting {
            attempt: self.attempts,
            started_at: at,
        };
        self.dirty = true;
        self.attempts
    }

    pub(crate) fn enter_running(&mut self, job_id: JobId) {
        if let JobPhase::Submitting { started_at, .. } = self.phase {
            self.phase = JobPhase::Running { job_id, started_at };
            self.dirty = true;
        }
    }

    pub(crate) fn set_poll_in_flight(&mut self, in_flight: bool) {
        self.poll_in_flight = in_flight;
    }

    pub(crate) fn record_poll_error(&mut self, message: String) {
        self.last_poll_error = Some(message);
        self.dirty = true;
    }

    /// Full replacement of the server-reported progress fields.
    pub(crate) fn apply_status(&mut self, update: &StatusUpdate) {
        self.progress = update.progress;
        self.current_step = update.current_step.clone();
        self.step_index = parse_step_index(&update.current_step);
        self.logs = update.logs.clone();
        self.last_poll_error = None;
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self, result: ResultPayload) {
        if let JobPhase::Running { job_id, .. } = &self.phase {
            self.phase = JobPhase::Completed {
                job_id: job_id.clone(),
                result: Box::new(result),
            };
            self.poll_in_flight = false;
            self.dirty = true;
        }
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = JobPhase::Errored { message };
        self.poll_in_flight = false;
        self.dirty = true;
    }

    /// Elapsed time never moves backwards.
    pub(crate) fn tick_elapsed(&mut self, now: Instant) {
        let Some(started_at) = self.phase.started_at() else {
            return;
        };
        let secs = now.saturating_duration_since(started_at).as_secs();
        if secs > self.elapsed_secs {
            self.elapsed_secs = secs;
            self.dirty = true;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.clear_job();
        self.validation_error = None;
        self.timers = ActiveTimers::default();
        self.dirty = true;
    }

    fn clear_job(&mut self) {
        self.phase = JobPhase::Idle;
        self.submitted_topic = None;
        self.progress = 0;
        self.current_step.clear();
        self.step_index = 0;
        self.logs.clear();
        self.elapsed_secs = 0;
        self.last_poll_error = None;
        self.poll_in_flight = false;
    }
}
