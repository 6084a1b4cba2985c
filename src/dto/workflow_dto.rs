use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::application::ApplicationRecord;
use crate::models::interview::InterviewDetails;
use crate::models::stage::{ApplicationStage, StageConvention};
use crate::services::stage_vocabulary;
use crate::services::transition_executor::BulkResult;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub record: ApplicationRecord,
    /// Target stage in either spelling convention.
    pub target: String,
    /// Move-specific data, read according to the target stage.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
    /// Treat a request for the stage the record is already in as a no-op.
    #[serde(default)]
    pub idempotent: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub record: ApplicationRecord,
    pub applied: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkTransitionRequest {
    pub records: Vec<ApplicationRecord>,
    pub target: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkItemResponse {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ApplicationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub error: Option<serde_json::Value>,
}

impl From<BulkResult> for BulkItemResponse {
    fn from(result: BulkResult) -> Self {
        match result.outcome {
            Ok(record) => Self {
                id: result.id,
                ok: true,
                record: Some(record),
                error: None,
            },
            Err(err) => Self {
                id: result.id,
                ok: false,
                record: None,
                error: Some(err.to_body()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkTransitionResponse {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResponse>,
}

impl From<Vec<BulkResult>> for BulkTransitionResponse {
    fn from(results: Vec<BulkResult>) -> Self {
        let results: Vec<BulkItemResponse> = results.into_iter().map(Into::into).collect();
        let succeeded = results.iter().filter(|r| r.ok).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    pub record: ApplicationRecord,
    pub details: InterviewDetails,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidateTransitionRequest {
    pub current: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageQuery {
    #[serde(default)]
    pub convention: StageConvention,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StageSpellings {
    pub stage: ApplicationStage,
    pub label: String,
    pub hyphenated: String,
    pub underscored: String,
}

impl From<ApplicationStage> for StageSpellings {
    fn from(stage: ApplicationStage) -> Self {
        Self {
            stage,
            label: stage.label().to_string(),
            hyphenated: stage_vocabulary::to_external_format(stage, StageConvention::Hyphenated)
                .to_string(),
            underscored: stage_vocabulary::to_external_format(stage, StageConvention::Underscored)
                .to_string(),
        }
    }
}

/// Where a stage can go next, spelled in the requested convention.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StageRoutesResponse {
    pub stage: String,
    pub label: String,
    pub next_stage: Option<String>,
    pub branches: Vec<String>,
    pub terminal: bool,
}
