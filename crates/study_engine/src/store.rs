use std::fmt;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TABLE: &str = "q_sort_responses";

/// One participant's completed Q-sort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSubmission {
    pub respondent_name: String,
    pub sort_data: Value,
    /// Seconds spent sorting.
    pub duration: u64,
    pub interview_responses: Value,
}

/// Row echoed back by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredSubmission {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub respondent_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("store rejected insert ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed store reply: {0}")]
    Malformed(String),
    #[error("store returned no rows")]
    EmptyAcknowledgment,
}

#[derive(Clone)]
pub struct StoreSettings {
    pub url: Url,
    pub anon_key: String,
    pub table: String,
    pub request_timeout: Duration,
}

impl StoreSettings {
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, StoreError> {
        let url = Url::parse(url).map_err(|err| StoreError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            url,
            anon_key: anon_key.into(),
            table: DEFAULT_TABLE.to_string(),
            request_timeout: Duration::from_secs(30),
        })
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("url", &self.url.as_str())
            .field("anon_key", &"<redacted>")
            .field("table", &self.table)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Failures are logged and reported as `None`; callers only learn whether
/// the sort was stored.
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, submission: &SortSubmission) -> Option<StoredSubmission>;
}

/// PostgREST-style table endpoint.
#[derive(Debug, Clone)]
pub struct RestSubmissionStore {
    settings: StoreSettings,
    client: reqwest::Client,
}

impl RestSubmissionStore {
    pub fn new(settings: StoreSettings) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn table_url(&self) -> Result<Url, StoreError> {
        let mut url = self.settings.url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl("url cannot be a base".into()))?;
            path.pop_if_empty()
                .extend(["rest", "v1", self.settings.table.as_str()]);
        }
        Ok(url)
    }

    async fn try_insert(&self, submission: &SortSubmission) -> Result<StoredSubmission, StoreError> {
        let response = self
            .client
            .post(self.table_url()?)
            .header("apikey", &self.settings.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.settings.anon_key))
            .header("Prefer", "return=representation")
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<StoredSubmission> =
            serde_json::from_str(&body).map_err(|err| StoreError::Malformed(err.to_string()))?;
        rows.into_iter().next().ok_or(StoreError::EmptyAcknowledgment)
    }
}

#[async_trait::async_trait]
impl SubmissionStore for RestSubmissionStore {
    async fn insert(&self, submission: &SortSubmission) -> Option<StoredSubmission> {
        match self.try_insert(submission).await {
            Ok(stored) => {
                study_logging::study_info!(
                    "Stored sort for {} (id {:?})",
                    submission.respondent_name,
                    stored.id
                );
                Some(stored)
            }
            Err(err) => {
                study_logging::study_error!(
                    "Failed to store sort for {}: {err}",
                    submission.respondent_name
                );
                None
            }
        }
    }
}
