use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use url::Url;

use recruitment_workflow::models::interview::{InterviewDetails, InterviewResult};
use recruitment_workflow::models::stage::ApplicationStage;
use recruitment_workflow::services::application_api::{
    ApplicationApi, CollaboratorError, HttpApplicationApi,
};

const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    bearer == Some("Bearer test-token") && headers.contains_key("x-request-id")
}

async fn shortlist(
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    Json(json!({ "id": id, "status": "shortlisted", "note": body["note"] })).into_response()
}

async fn schedule(Path(id): Path<String>, Json(body): Json<JsonValue>) -> Response {
    if body["location"].as_str().unwrap_or_default().is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "location required").into_response();
    }
    Json(json!({ "id": id, "stage": "interview_scheduled" })).into_response()
}

async fn result(Path(id): Path<String>, Json(body): Json<JsonValue>) -> Response {
    if id == "closed" {
        return (StatusCode::CONFLICT, "application already decided").into_response();
    }
    let status = match body["result"].as_str() {
        Some("passed") => "interview_passed",
        _ => "interview_failed",
    };
    Json(json!({ "id": id, "status": status })).into_response()
}

async fn reject(Path(id): Path<String>, Json(body): Json<JsonValue>) -> Response {
    Json(json!({ "id": id, "status": "rejected", "reason": body["reason"] })).into_response()
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/applications/:id/shortlist", post(shortlist))
        .route("/api/applications/:id/interview", post(schedule).put(schedule))
        .route("/api/applications/:id/interview/result", post(result))
        .route("/api/applications/:id/reject", post(reject));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: Option<&str>) -> HttpApplicationApi {
    let base = Url::parse(&format!("http://{}/api/", addr)).unwrap();
    HttpApplicationApi::new(base, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn shortlist_sends_auth_and_parses_the_backend_stage() {
    let addr = spawn_backend().await;
    let api = client(addr, Some(TOKEN));

    let remote = api
        .shortlist("app-1", Some("strong CV".to_string()))
        .await
        .expect("shortlist");

    assert_eq!(remote.id, "app-1");
    assert_eq!(remote.stage().map(|s| s.ok()), Some(Some(ApplicationStage::Shortlisted)));
}

#[tokio::test]
async fn missing_token_surfaces_as_rejected() {
    let addr = spawn_backend().await;
    let api = client(addr, None);

    let err = api.shortlist("app-1", None).await.unwrap_err();
    match err {
        CollaboratorError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "missing token");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn schedule_and_reschedule_post_and_put_the_details() {
    let addr = spawn_backend().await;
    let api = client(addr, Some(TOKEN));
    let details = InterviewDetails::new("2025-04-02", "10:00", "Branch office");

    let scheduled = api.schedule_interview("app-2", &details).await.unwrap();
    assert_eq!(
        scheduled.stage().map(|s| s.ok()),
        Some(Some(ApplicationStage::InterviewScheduled))
    );

    let moved = api.reschedule_interview("app-2", &details).await.unwrap();
    assert_eq!(moved.status.as_deref(), Some("interview_scheduled"));

    let blank = InterviewDetails::new("2025-04-02", "10:00", "");
    let err = api.schedule_interview("app-2", &blank).await.unwrap_err();
    assert!(matches!(err, CollaboratorError::Rejected { status: 422, .. }));
}

#[tokio::test]
async fn interview_result_and_reject_map_to_failed_stage() {
    let addr = spawn_backend().await;
    let api = client(addr, Some(TOKEN));

    let passed = api
        .complete_interview("app-3", InterviewResult::Passed, None)
        .await
        .unwrap();
    assert_eq!(passed.stage().map(|s| s.ok()), Some(Some(ApplicationStage::InterviewPassed)));

    let rejected = api.reject("app-3", "position filled").await.unwrap();
    assert_eq!(rejected.stage().map(|s| s.ok()), Some(Some(ApplicationStage::InterviewFailed)));

    let err = api
        .complete_interview("closed", InterviewResult::Failed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::Rejected { status: 409, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(addr, Some(TOKEN));
    let err = api.shortlist("app-4", None).await.unwrap_err();
    assert!(matches!(err, CollaboratorError::Transport(_)));
}

#[test]
fn rejects_urls_that_cannot_be_a_base() {
    let base = Url::parse("mailto:hr@example.com").unwrap();
    let err = HttpApplicationApi::new(base, None, Duration::from_secs(1));
    assert!(matches!(err, Err(CollaboratorError::Url(_))));
}
