use std::fmt;

use thiserror::Error;

/// Input rejected before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("연구 주제를 입력해주세요.")]
    EmptyTopic,
    #[error("API Key를 입력해주세요.")]
    EmptyCredential,
}

/// Caller-supplied API credential, forwarded to the backend as-is.
///
/// `Debug` is redacted so the key never ends up in logs or panic messages.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// A validated start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub topic: String,
    pub credential: Credential,
}

/// Reject blank topics or credentials. The topic is trimmed; the credential is
/// forwarded untouched.
pub fn validate_start(topic: &str, credential: &Credential) -> Result<StartRequest, ValidationError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ValidationError::EmptyTopic);
    }
    if credential.is_blank() {
        return Err(ValidationError::EmptyCredential);
    }
    Ok(StartRequest {
        topic: topic.to_string(),
        credential: credential.clone(),
    })
}
