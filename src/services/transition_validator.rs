use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::stage::ApplicationStage;
use crate::models::transition::StageTransition;
use crate::services::transition_rules;

pub const NOT_NEXT_STAGE: &str = "not-next-stage";
pub const MISSING_REQUIRED_FIELDS: &str = "missing-required-fields";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

impl ValidationResult {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            reason: None,
            missing_fields: Vec::new(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
            missing_fields: Vec::new(),
        }
    }

    pub fn missing(fields: Vec<String>) -> Self {
        Self {
            ok: false,
            reason: Some(format!("{}: {}", MISSING_REQUIRED_FIELDS, fields.join(", "))),
            missing_fields: fields,
        }
    }
}

/// A move is legal only when `target` is one step away from `current`.
/// Staying put is never a transition.
pub fn validate(current: ApplicationStage, target: ApplicationStage) -> ValidationResult {
    if transition_rules::branches_from(current).contains(&target) {
        ValidationResult::accepted()
    } else {
        ValidationResult::rejected(NOT_NEXT_STAGE)
    }
}

pub fn ensure_valid(
    current: ApplicationStage,
    target: ApplicationStage,
) -> WorkflowResult<&'static StageTransition> {
    transition_rules::find(current, target)
        .ok_or(WorkflowError::InvalidTransition { current, target })
}
