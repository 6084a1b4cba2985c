use axum::{
    extract::Path,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::pipeline_dto::{ChecklistRequest, PipelineStageResponse, ValidatePipelineTransitionRequest},
    error::{Error, Result},
    models::pipeline::{DeploymentStage, UnknownDeploymentStage},
    services::{pipeline_service, stage_vocabulary},
};

fn parse_stage(token: &str, into_error: fn(String) -> Error) -> Result<DeploymentStage> {
    token
        .parse()
        .map_err(|e: UnknownDeploymentStage| into_error(e.to_string()))
}

fn stage_from_path(token: &str) -> Result<DeploymentStage> {
    parse_stage(token, Error::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/pipeline/stages",
    responses(
        (status = 200, description = "Deployment stages in order", body = [PipelineStageResponse])
    )
)]
pub async fn list_stages() -> impl IntoResponse {
    let stages: Vec<PipelineStageResponse> = pipeline_service::stages()
        .iter()
        .map(PipelineStageResponse::from)
        .collect();
    Json(stages)
}

#[utoipa::path(
    get,
    path = "/api/pipeline/stages/{stage}",
    params(
        ("stage" = String, Path, description = "Deployment stage id")
    ),
    responses(
        (status = 200, description = "Stage definition", body = PipelineStageResponse),
        (status = 404, description = "Unknown deployment stage")
    )
)]
pub async fn get_stage(Path(stage): Path<String>) -> Result<impl IntoResponse> {
    let stage = stage_from_path(&stage)?;
    Ok(Json(PipelineStageResponse::from(pipeline_service::definition(stage))))
}

#[utoipa::path(
    get,
    path = "/api/pipeline/stages/{stage}/progress",
    params(
        ("stage" = String, Path, description = "Deployment stage id")
    ),
    responses(
        (status = 200, description = "Progress through the pipeline", body = PipelineProgress),
        (status = 404, description = "Unknown deployment stage")
    )
)]
pub async fn get_progress(Path(stage): Path<String>) -> Result<impl IntoResponse> {
    let stage = stage_from_path(&stage)?;
    Ok(Json(pipeline_service::progress(stage)))
}

#[utoipa::path(
    get,
    path = "/api/pipeline/stages/{stage}/documents",
    params(
        ("stage" = String, Path, description = "Deployment stage id")
    ),
    responses(
        (status = 200, description = "Documents expected at this stage"),
        (status = 404, description = "Unknown deployment stage")
    )
)]
pub async fn get_documents(Path(stage): Path<String>) -> Result<impl IntoResponse> {
    let stage = stage_from_path(&stage)?;
    let response = PipelineStageResponse::from(pipeline_service::definition(stage));
    Ok(Json(json!({
        "stage": stage,
        "required_documents": response.required_documents,
    })))
}

#[utoipa::path(
    post,
    path = "/api/pipeline/stages/{stage}/checklist",
    params(
        ("stage" = String, Path, description = "Deployment stage id")
    ),
    request_body = ChecklistRequest,
    responses(
        (status = 200, description = "Document completeness", body = DocumentChecklist),
        (status = 404, description = "Unknown deployment stage")
    )
)]
pub async fn document_checklist(
    Path(stage): Path<String>,
    Json(payload): Json<ChecklistRequest>,
) -> Result<impl IntoResponse> {
    let stage = stage_from_path(&stage)?;
    Ok(Json(pipeline_service::document_checklist(
        stage,
        &payload.submitted_documents,
    )))
}

#[utoipa::path(
    post,
    path = "/api/pipeline/validate",
    request_body = ValidatePipelineTransitionRequest,
    responses(
        (status = 200, description = "Whether the move is allowed", body = ValidationResult),
        (status = 400, description = "Unknown deployment stage")
    )
)]
pub async fn validate_transition(
    Json(payload): Json<ValidatePipelineTransitionRequest>,
) -> Result<impl IntoResponse> {
    let from = parse_stage(&payload.from, Error::BadRequest)?;
    let to = parse_stage(&payload.to, Error::BadRequest)?;

    Ok(Json(pipeline_service::validate_transition(
        from,
        to,
        &payload.present_fields(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/pipeline/eligibility/{application_stage}",
    params(
        ("application_stage" = String, Path, description = "Recruitment stage token")
    ),
    responses(
        (status = 200, description = "Whether the application may enter deployment"),
        (status = 400, description = "Unknown stage token")
    )
)]
pub async fn eligibility(Path(application_stage): Path<String>) -> Result<impl IntoResponse> {
    let stage = stage_vocabulary::to_canonical(&application_stage)?;
    let eligible = pipeline_service::is_eligible(stage);
    Ok(Json(json!({
        "stage": stage,
        "eligible": eligible,
        "entry_stage": eligible.then(|| pipeline_service::entry_stage().id),
    })))
}
