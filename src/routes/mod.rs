pub mod health;
pub mod pipeline;
pub mod workflow;

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    dto::{
        pipeline_dto::{
            ChecklistRequest, DocumentRequirementResponse, PipelineStageResponse,
            ValidatePipelineTransitionRequest,
        },
        workflow_dto::{
            BulkItemResponse, BulkTransitionRequest, BulkTransitionResponse, RescheduleRequest,
            StageRoutesResponse, StageSpellings, TransitionRequest, TransitionResponse,
            ValidateTransitionRequest,
        },
    },
    models::{
        application::{ApplicationRecord, StageHistoryEntry},
        interview::{InterviewDetails, InterviewResult},
        pipeline::{
            ChecklistItem, DeploymentStage, DocumentChecklist, PipelineProgress, StageCategory,
        },
        stage::{ApplicationStage, StageConvention},
    },
    services::transition_validator::ValidationResult,
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        workflow::validate_transition,
        workflow::list_stages,
        workflow::stage_routes,
        workflow::transition,
        workflow::bulk_transition,
        workflow::reschedule,
        pipeline::list_stages,
        pipeline::get_stage,
        pipeline::get_progress,
        pipeline::get_documents,
        pipeline::document_checklist,
        pipeline::validate_transition,
        pipeline::eligibility,
    ),
    components(schemas(
        ApplicationStage,
        StageConvention,
        ApplicationRecord,
        StageHistoryEntry,
        InterviewDetails,
        InterviewResult,
        ValidationResult,
        TransitionRequest,
        TransitionResponse,
        BulkTransitionRequest,
        BulkTransitionResponse,
        BulkItemResponse,
        RescheduleRequest,
        ValidateTransitionRequest,
        StageSpellings,
        StageRoutesResponse,
        DeploymentStage,
        StageCategory,
        PipelineProgress,
        ChecklistItem,
        DocumentChecklist,
        PipelineStageResponse,
        DocumentRequirementResponse,
        ValidatePipelineTransitionRequest,
        ChecklistRequest,
    )),
    tags(
        (name = "workflow", description = "Application stage transitions"),
        (name = "pipeline", description = "Post-interview deployment pipeline")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: AppState) -> Router {
    let workflow_api = Router::new()
        .route("/api/workflow/validate", post(workflow::validate_transition))
        .route("/api/workflow/stages", get(workflow::list_stages))
        .route("/api/workflow/stages/:token", get(workflow::stage_routes))
        .route("/api/workflow/transition", post(workflow::transition))
        .route(
            "/api/workflow/transition/bulk",
            post(workflow::bulk_transition),
        )
        .route("/api/workflow/reschedule", post(workflow::reschedule));

    let pipeline_api = Router::new()
        .route("/api/pipeline/stages", get(pipeline::list_stages))
        .route("/api/pipeline/stages/:stage", get(pipeline::get_stage))
        .route(
            "/api/pipeline/stages/:stage/progress",
            get(pipeline::get_progress),
        )
        .route(
            "/api/pipeline/stages/:stage/documents",
            get(pipeline::get_documents),
        )
        .route(
            "/api/pipeline/stages/:stage/checklist",
            post(pipeline::document_checklist),
        )
        .route("/api/pipeline/validate", post(pipeline::validate_transition))
        .route(
            "/api/pipeline/eligibility/:application_stage",
            get(pipeline::eligibility),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(workflow_api)
        .merge(pipeline_api)
        .with_state(state)
}
