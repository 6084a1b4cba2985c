use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::WorkflowResult;
use crate::models::interview::{InterviewDetails, InterviewResult};
use crate::models::stage::{ApplicationStage, StageConvention};
use crate::services::stage_vocabulary;

/// Failure reported by the backend application API. Passed through the
/// workflow core untouched so callers can inspect the original cause.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("backend url error: {0}")]
    Url(String),

    #[error("{0}")]
    Other(String),
}

/// Application representation returned by the backend after an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteApplication {
    pub id: String,
    /// Stage token in the backend's underscored convention.
    #[serde(default, alias = "stage")]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteApplication {
    pub fn new(id: impl Into<String>, stage: ApplicationStage) -> Self {
        Self {
            id: id.into(),
            status: Some(
                stage_vocabulary::to_external_format(stage, StageConvention::Underscored).to_string(),
            ),
            updated_at: None,
        }
    }

    pub fn stage(&self) -> Option<WorkflowResult<ApplicationStage>> {
        self.status.as_deref().map(stage_vocabulary::to_canonical)
    }
}

/// Side-effecting operations the workflow core drives on the backend.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn shortlist(
        &self,
        application_id: &str,
        note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError>;

    async fn schedule_interview(
        &self,
        application_id: &str,
        details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError>;

    async fn reschedule_interview(
        &self,
        application_id: &str,
        details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError>;

    async fn complete_interview(
        &self,
        application_id: &str,
        result: InterviewResult,
        note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError>;

    async fn reject(
        &self,
        application_id: &str,
        reason: &str,
    ) -> Result<RemoteApplication, CollaboratorError>;
}

#[derive(Clone)]
pub struct HttpApplicationApi {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpApplicationApi {
    pub fn new(
        base_url: Url,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorError> {
        if base_url.cannot_be_a_base() {
            return Err(CollaboratorError::Url(format!(
                "{} cannot be used as an API base",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        let api_token = api_token.filter(|token| !token.trim().is_empty());

        info!("Backend application API configured at {}", base_url);

        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    fn endpoint(&self, application_id: &str, segments: &[&str]) -> Result<Url, CollaboratorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("applications")
            .push(application_id)
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: serde_json::Value,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let request_id = uuid::Uuid::new_v4();
        debug!(%request_id, %method, %url, "calling backend application API");

        let mut request = self
            .client
            .request(method, url)
            .header("x-request-id", request_id.to_string())
            .json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<RemoteApplication>().await?)
    }
}

#[async_trait]
impl ApplicationApi for HttpApplicationApi {
    async fn shortlist(
        &self,
        application_id: &str,
        note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let url = self.endpoint(application_id, &["shortlist"])?;
        self.send(Method::POST, url, json!({ "note": note })).await
    }

    async fn schedule_interview(
        &self,
        application_id: &str,
        details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let url = self.endpoint(application_id, &["interview"])?;
        let body = serde_json::to_value(details).map_err(|e| CollaboratorError::Other(e.to_string()))?;
        self.send(Method::POST, url, body).await
    }

    async fn reschedule_interview(
        &self,
        application_id: &str,
        details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let url = self.endpoint(application_id, &["interview"])?;
        let body = serde_json::to_value(details).map_err(|e| CollaboratorError::Other(e.to_string()))?;
        self.send(Method::PUT, url, body).await
    }

    async fn complete_interview(
        &self,
        application_id: &str,
        result: InterviewResult,
        note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let url = self.endpoint(application_id, &["interview", "result"])?;
        self.send(
            Method::POST,
            url,
            json!({ "result": result.as_str(), "note": note }),
        )
        .await
    }

    async fn reject(
        &self,
        application_id: &str,
        reason: &str,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let url = self.endpoint(application_id, &["reject"])?;
        self.send(Method::POST, url, json!({ "reason": reason })).await
    }
}
