use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::stage::ApplicationStage;
use crate::services::application_api::CollaboratorError;

pub type Result<T> = std::result::Result<T, Error>;

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Failures raised by the workflow core. None of them are logged or
/// retried here; callers decide what to show and whether to try again.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unknown stage '{token}'")]
    UnknownStage { token: String },

    #[error("cannot move application from {current} to {target}: not-next-stage")]
    InvalidTransition {
        current: ApplicationStage,
        target: ApplicationStage,
    },

    #[error("missing required fields: {}", missing_fields.join(", "))]
    MissingPayload { missing_fields: Vec<String> },

    #[error("payload does not belong to a transition into {target}")]
    PayloadMismatch { target: ApplicationStage },

    #[error("malformed payload for a transition into {target}: {reason}")]
    MalformedPayload {
        target: ApplicationStage,
        reason: String,
    },

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("interview can only be rescheduled from interview-scheduled, application is {current}")]
    RescheduleNotAllowed { current: ApplicationStage },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl WorkflowError {
    pub const fn code(&self) -> &'static str {
        match self {
            WorkflowError::UnknownStage { .. } => "unknown_stage",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::MissingPayload { .. } => "missing_payload",
            WorkflowError::PayloadMismatch { .. } => "payload_mismatch",
            WorkflowError::MalformedPayload { .. } => "malformed_payload",
            WorkflowError::InvalidPayload(_) => "invalid_payload",
            WorkflowError::RescheduleNotAllowed { .. } => "reschedule_not_allowed",
            WorkflowError::Collaborator(_) => "collaborator_failure",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            WorkflowError::UnknownStage { .. }
            | WorkflowError::PayloadMismatch { .. }
            | WorkflowError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            WorkflowError::InvalidTransition { .. } | WorkflowError::RescheduleNotAllowed { .. } => {
                StatusCode::CONFLICT
            }
            WorkflowError::MissingPayload { .. } | WorkflowError::InvalidPayload(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Collaborator(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Structured body for UI diagnostics: stage labels for rejected moves,
    /// field names for incomplete payloads.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        match self {
            WorkflowError::InvalidTransition { current, target } => {
                body["current"] = json!({ "stage": current, "label": current.label() });
                body["target"] = json!({ "stage": target, "label": target.label() });
            }
            WorkflowError::MissingPayload { missing_fields } => {
                body["missing_fields"] = json!(missing_fields);
            }
            WorkflowError::InvalidPayload(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|field| field.to_string()).collect();
                fields.sort_unstable();
                body["invalid_fields"] = json!(fields);
            }
            WorkflowError::MalformedPayload { target, .. } => {
                body["target"] = json!({ "stage": target, "label": target.label() });
            }
            WorkflowError::RescheduleNotAllowed { current } => {
                body["current"] = json!({ "stage": current, "label": current.label() });
            }
            _ => {}
        }
        body
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if let Error::Workflow(err) = &self {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(error = %err, code = err.code(), "workflow request failed");
            } else {
                tracing::warn!(error = %err, code = err.code(), "workflow request rejected");
            }
            return (status, Json(err.to_body())).into_response();
        }

        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
