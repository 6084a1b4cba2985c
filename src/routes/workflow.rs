use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::workflow_dto::{
        BulkTransitionRequest, BulkTransitionResponse, RescheduleRequest, StageQuery,
        StageRoutesResponse, StageSpellings, TransitionRequest, TransitionResponse,
        ValidateTransitionRequest,
    },
    error::Result,
    models::{stage::ApplicationStage, transition::TransitionPayload},
    services::{stage_vocabulary, transition_rules, transition_validator},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/workflow/validate",
    request_body = ValidateTransitionRequest,
    responses(
        (status = 200, description = "Whether the move is allowed", body = ValidationResult),
        (status = 400, description = "Unknown stage token")
    )
)]
pub async fn validate_transition(
    Json(payload): Json<ValidateTransitionRequest>,
) -> Result<impl IntoResponse> {
    let current = stage_vocabulary::to_canonical(&payload.current)?;
    let target = stage_vocabulary::to_canonical(&payload.target)?;
    Ok(Json(transition_validator::validate(current, target)))
}

#[utoipa::path(
    get,
    path = "/api/workflow/stages",
    responses(
        (status = 200, description = "Canonical stages with both spellings", body = [StageSpellings])
    )
)]
pub async fn list_stages() -> impl IntoResponse {
    let stages: Vec<StageSpellings> = ApplicationStage::ALL.into_iter().map(Into::into).collect();
    Json(stages)
}

#[utoipa::path(
    get,
    path = "/api/workflow/stages/{token}",
    params(
        ("token" = String, Path, description = "Stage token in any accepted spelling"),
        ("convention" = Option<String>, Query, description = "hyphenated (default) or underscored")
    ),
    responses(
        (status = 200, description = "Next stage and branches", body = StageRoutesResponse),
        (status = 400, description = "Unknown stage token")
    )
)]
pub async fn stage_routes(
    Path(token): Path<String>,
    Query(query): Query<StageQuery>,
) -> Result<impl IntoResponse> {
    let stage = stage_vocabulary::to_canonical(&token)?;
    let spell = |s: ApplicationStage| stage_vocabulary::to_external_format(s, query.convention).to_string();

    Ok(Json(StageRoutesResponse {
        stage: spell(stage),
        label: stage.label().to_string(),
        next_stage: transition_rules::next_stage(stage).map(spell),
        branches: transition_rules::branches_from(stage).into_iter().map(spell).collect(),
        terminal: transition_rules::is_terminal(stage),
    }))
}

#[utoipa::path(
    post,
    path = "/api/workflow/transition",
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Updated application record", body = TransitionResponse),
        (status = 400, description = "Unknown stage, mismatched or malformed payload"),
        (status = 409, description = "Target is not a next stage"),
        (status = 422, description = "Missing or invalid payload fields"),
        (status = 502, description = "Backend application API failed")
    )
)]
#[axum::debug_handler]
pub async fn transition(
    State(state): State<AppState>,
    Json(payload): Json<TransitionRequest>,
) -> Result<impl IntoResponse> {
    let target = stage_vocabulary::to_canonical(&payload.target)?;
    let record = payload.record.reconciled();
    let data = TransitionPayload::for_target(target, payload.payload)?;

    let (record, applied) = if payload.idempotent {
        state.executor.ensure_stage(&record, target, data).await?
    } else {
        (state.executor.execute(&record, target, data).await?, true)
    };

    Ok(Json(TransitionResponse { record, applied }))
}

#[utoipa::path(
    post,
    path = "/api/workflow/transition/bulk",
    request_body = BulkTransitionRequest,
    responses(
        (status = 200, description = "Per-record outcomes in request order", body = BulkTransitionResponse),
        (status = 400, description = "Unknown target stage or malformed payload")
    )
)]
#[axum::debug_handler]
pub async fn bulk_transition(
    State(state): State<AppState>,
    Json(payload): Json<BulkTransitionRequest>,
) -> Result<impl IntoResponse> {
    let target = stage_vocabulary::to_canonical(&payload.target)?;
    let data = TransitionPayload::for_target(target, payload.payload)?;
    let records: Vec<_> = payload.records.into_iter().map(|r| r.reconciled()).collect();

    let results = state.executor.execute_bulk(&records, target, data).await;

    let response = BulkTransitionResponse::from(results);
    tracing::info!(
        target = %target,
        total = response.total,
        failed = response.failed,
        "bulk transition finished"
    );
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/workflow/reschedule",
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Record with replaced interview details", body = ApplicationRecord),
        (status = 409, description = "Application has no scheduled interview"),
        (status = 422, description = "Missing or invalid interview fields")
    )
)]
#[axum::debug_handler]
pub async fn reschedule(
    State(state): State<AppState>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<impl IntoResponse> {
    let record = payload.record.reconciled();
    let updated = state.executor.reschedule(&record, payload.details).await?;
    Ok(Json(updated))
}
