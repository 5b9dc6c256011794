use serde::Deserialize;
use serde_json::Value;
use study_core::{JobId, TimerKind};
use thiserror::Error;

/// Events reported back to the platform loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        attempt: u64,
        result: Result<JobId, BackendError>,
    },
    StatusReceived {
        job_id: JobId,
        result: Result<StatusResponse, BackendError>,
    },
    TimerFired(TimerKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    /// Message reported by the backend itself, passed through verbatim.
    #[error("{0}")]
    Server(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Body of `GET /api/status/{session_id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Running,
    Completed,
    Error,
    Other(String),
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::Other(raw),
        }
    }
}
