use std::time::Duration;

use serde::{Deserialize, Serialize};
use study_core::{JobId, StartRequest};
use url::Url;

use crate::{BackendError, StatusResponse};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, BackendError> {
        let url =
            Url::parse(base_url).map_err(|err| BackendError::InvalidUrl(err.to_string()))?;
        Ok(Self::new(url))
    }
}

/// Remote analysis service: accepts a job, then reports its status.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    async fn start(&self, request: &StartRequest) -> Result<JobId, BackendError>;
    async fn status(&self, job_id: &JobId) -> Result<StatusResponse, BackendError>;
}

#[derive(Serialize)]
struct StartBody<'a> {
    topic: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct StartReply {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.settings.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                BackendError::InvalidUrl(format!("{} cannot be a base", self.settings.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl JobBackend for ReqwestBackend {
    async fn start(&self, request: &StartRequest) -> Result<JobId, BackendError> {
        let url = self.endpoint(&["api", "start"])?;
        let body = StartBody {
            topic: &request.topic,
            api_key: request.credential.expose(),
        };
        study_logging::study_debug!("POST {url}");

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<StartReply>(&bytes) {
            Ok(StartReply {
                error: Some(message),
                ..
            }) => Err(BackendError::Server(message)),
            Ok(StartReply {
                session_id: Some(id),
                ..
            }) if !id.trim().is_empty() => Ok(JobId::new(id)),
            Ok(_) if status.is_success() => Err(BackendError::MalformedResponse(
                "start reply carries neither session_id nor error".into(),
            )),
            Err(err) if status.is_success() => {
                Err(BackendError::MalformedResponse(err.to_string()))
            }
            _ => Err(BackendError::HttpStatus(status.as_u16())),
        }
    }

    async fn status(&self, job_id: &JobId) -> Result<StatusResponse, BackendError> {
        let url = self.endpoint(&["api", "status", job_id.as_str()])?;
        study_logging::study_trace!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return match serde_json::from_slice::<ErrorReply>(&bytes) {
                Ok(ErrorReply {
                    error: Some(message),
                }) => Err(BackendError::Server(message)),
                _ => Err(BackendError::HttpStatus(status.as_u16())),
            };
        }

        let reply: StatusResponse = serde_json::from_slice(&bytes)
            .map_err(|err| BackendError::MalformedResponse(err.to_string()))?;
        match (&reply.status, &reply.error) {
            (Some(_), _) => Ok(reply),
            (None, Some(message)) => Err(BackendError::Server(message.clone())),
            (None, None) => Err(BackendError::MalformedResponse(
                "status reply carries no status".into(),
            )),
        }
    }
}
