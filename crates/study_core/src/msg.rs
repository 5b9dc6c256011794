use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the topic input.
    TopicChanged(String),
    /// User edited the credential input.
    CredentialChanged(String),
    /// User submitted the form.
    StartClicked { at: Instant },
    /// Backend acknowledged (or rejected) the start request for `attempt`.
    SubmitFinished {
        attempt: u64,
        outcome: Result<crate::JobId, String>,
    },
    /// Poll timer fired.
    PollTick,
    /// Status response for `job_id`, or the transport error that replaced it.
    PollFinished {
        job_id: crate::JobId,
        outcome: Result<crate::StatusUpdate, String>,
    },
    /// Elapsed timer fired.
    ElapsedTick { now: Instant },
    /// User asked to return to the input form.
    ResetClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
