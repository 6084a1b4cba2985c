use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

use crate::models::pipeline::{DeploymentStage, PipelineStageDefinition, StageCategory};
use crate::services::pipeline_service;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentRequirementResponse {
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PipelineStageResponse {
    pub id: DeploymentStage,
    pub order: u8,
    pub label: String,
    pub category: StageCategory,
    pub required_documents: Vec<DocumentRequirementResponse>,
    pub required_fields: Vec<String>,
    pub next_stage: Option<DeploymentStage>,
}

impl From<&PipelineStageDefinition> for PipelineStageResponse {
    fn from(definition: &PipelineStageDefinition) -> Self {
        Self {
            id: definition.id,
            order: definition.order,
            label: definition.label.to_string(),
            category: definition.category,
            required_documents: definition
                .required_documents
                .iter()
                .map(|doc| DocumentRequirementResponse {
                    name: doc.name.to_string(),
                    required: doc.required,
                })
                .collect(),
            required_fields: definition
                .required_fields
                .iter()
                .map(|field| field.to_string())
                .collect(),
            next_stage: pipeline_service::next_stage(definition.id).map(|next| next.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidatePipelineTransitionRequest {
    pub from: String,
    pub to: String,
    /// Field values collected for the move; blanks and nulls count as missing.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub supplied_fields: BTreeMap<String, serde_json::Value>,
}

impl ValidatePipelineTransitionRequest {
    pub fn present_fields(&self) -> BTreeSet<String> {
        self.supplied_fields
            .iter()
            .filter(|(_, value)| match value {
                serde_json::Value::Null => false,
                serde_json::Value::String(s) => !s.trim().is_empty(),
                serde_json::Value::Array(items) => !items.is_empty(),
                _ => true,
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChecklistRequest {
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub submitted_documents: BTreeSet<String>,
}
