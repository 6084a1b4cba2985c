use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use tokio_test::{assert_err, assert_ok};

use recruitment_workflow::error::WorkflowError;
use recruitment_workflow::models::application::ApplicationRecord;
use recruitment_workflow::models::interview::{InterviewDetails, InterviewResult};
use recruitment_workflow::models::stage::ApplicationStage::{self, *};
use recruitment_workflow::models::transition::TransitionPayload;
use recruitment_workflow::services::application_api::{
    ApplicationApi, CollaboratorError, RemoteApplication,
};
use recruitment_workflow::services::transition_executor::TransitionExecutor;
use recruitment_workflow::services::transition_rules;

mock! {
    pub Api {}

    #[async_trait]
    impl ApplicationApi for Api {
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
}

fn applied_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap()
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap()
}

fn record_at(id: &str, stage: ApplicationStage) -> ApplicationRecord {
    let mut record = ApplicationRecord::new(id, "job-7", "cand-3", applied_at());
    record.stage = stage;
    record.reconciled()
}

fn executor(api: MockApi) -> TransitionExecutor {
    TransitionExecutor::new(Arc::new(api)).with_clock(fixed_clock)
}

fn interview() -> InterviewDetails {
    InterviewDetails::new("2025-01-20", "14:30", "Head office, room 4")
}

#[tokio::test]
async fn shortlisting_stamps_timestamp_and_extends_history() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .times(1)
        .returning(|id, note| {
            assert_eq!(id, "app-1");
            assert_eq!(note, None);
            Ok(RemoteApplication::new(id, Shortlisted))
        });

    let record = ApplicationRecord::new("app-1", "job-7", "cand-3", applied_at());
    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, None).await);

    assert_eq!(updated.stage, Shortlisted);
    assert_eq!(updated.shortlisted_at, Some(fixed_clock()));
    assert_eq!(updated.history.len(), 2);
    assert_eq!(updated.history[1].stage, Shortlisted);
    assert_eq!(updated.history[1].entered_at, fixed_clock());
    assert!(updated.is_consistent());

    assert_eq!(record.stage, Applied);
    assert_eq!(record.history.len(), 1);
}

#[tokio::test]
async fn scheduling_without_details_names_every_missing_field() {
    let mut api = MockApi::new();
    api.expect_schedule_interview().never();
    let executor = executor(api);
    let record = record_at("app-2", Shortlisted);

    let err = assert_err!(executor.execute(&record, InterviewScheduled, None).await);
    assert!(matches!(
        err,
        WorkflowError::MissingPayload { ref missing_fields }
            if missing_fields == &["date", "time", "location"]
    ));

    let empty = TransitionPayload::schedule(InterviewDetails::default());
    let err = assert_err!(executor.execute(&record, InterviewScheduled, Some(empty)).await);
    assert!(matches!(err, WorkflowError::MissingPayload { .. }));
}

#[tokio::test]
async fn scheduling_reports_only_the_blank_fields() {
    let mut api = MockApi::new();
    api.expect_schedule_interview().never();
    let record = record_at("app-3", Shortlisted);

    let details = InterviewDetails::new("2025-01-20", "  ", "");
    let payload = TransitionPayload::schedule(details);
    let err = assert_err!(executor(api).execute(&record, InterviewScheduled, Some(payload)).await);

    match err {
        WorkflowError::MissingPayload { missing_fields } => {
            assert_eq!(missing_fields, vec!["time".to_string(), "location".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn malformed_interview_details_are_rejected_before_the_backend_call() {
    let mut api = MockApi::new();
    api.expect_schedule_interview().never();
    let record = record_at("app-4", Shortlisted);

    let mut details = interview();
    details.date = "20/01/2025".to_string();
    details.duration_minutes = 5;
    let payload = TransitionPayload::schedule(details);

    let err = assert_err!(executor(api).execute(&record, InterviewScheduled, Some(payload)).await);
    match err {
        WorkflowError::InvalidPayload(errors) => {
            let fields = errors.field_errors();
            assert!(fields.contains_key("date"));
            assert!(fields.contains_key("duration_minutes"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn scheduling_attaches_interview_details() {
    let mut api = MockApi::new();
    api.expect_schedule_interview()
        .times(1)
        .returning(|id, details| {
            assert_eq!(details.location, "Head office, room 4");
            Ok(RemoteApplication::new(id, InterviewScheduled))
        });

    let record = record_at("app-5", Shortlisted);
    let payload = TransitionPayload::schedule(interview());
    let updated = assert_ok!(executor(api).execute(&record, InterviewScheduled, Some(payload)).await);

    assert_eq!(updated.stage, InterviewScheduled);
    assert_eq!(updated.interview, Some(interview()));
    assert_eq!(updated.interview_scheduled_at, Some(fixed_clock()));
    assert_eq!(updated.history.len(), record.history.len() + 1);
}

#[tokio::test]
async fn failed_interview_is_terminal_with_decision_stamped() {
    let mut api = MockApi::new();
    api.expect_complete_interview()
        .times(1)
        .returning(|id, result, _| {
            assert_eq!(result, InterviewResult::Failed);
            Ok(RemoteApplication::new(id, InterviewFailed))
        });

    let record = record_at("app-6", InterviewScheduled);
    let updated = assert_ok!(executor(api).execute(&record, InterviewFailed, None).await);

    assert_eq!(updated.stage, InterviewFailed);
    assert_eq!(updated.decision_at, Some(fixed_clock()));
    assert_eq!(updated.interview_completed_at, Some(fixed_clock()));
    assert_eq!(transition_rules::next_stage(updated.stage), None);
    assert!(transition_rules::branches_from(updated.stage).is_empty());
}

#[tokio::test]
async fn failed_interview_with_reason_goes_through_reject() {
    let mut api = MockApi::new();
    api.expect_complete_interview().never();
    api.expect_reject().times(1).returning(|id, reason| {
        assert_eq!(reason, "No relevant experience");
        Ok(RemoteApplication::new(id, InterviewFailed))
    });

    let record = record_at("app-7", InterviewScheduled);
    let payload = TransitionPayload::reject("No relevant experience");
    let updated = assert_ok!(executor(api).execute(&record, InterviewFailed, Some(payload)).await);

    assert_eq!(updated.stage, InterviewFailed);
    assert_eq!(updated.recruiter_notes.as_deref(), Some("No relevant experience"));
    assert_eq!(
        updated.last_entry().and_then(|entry| entry.note.as_deref()),
        Some("No relevant experience")
    );
}

#[tokio::test]
async fn application_notes_replace_the_record_notes() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .times(1)
        .returning(|id, note| {
            assert_eq!(note.as_deref(), Some("strong CV"));
            Ok(RemoteApplication::new(id, Shortlisted))
        });

    let mut record = ApplicationRecord::new("app-14", "job-7", "cand-3", applied_at());
    record.notes = Some("referred by staff".to_string());
    let payload = TransitionPayload::Shortlist {
        note: Some("strong CV".to_string()),
        application_notes: Some("prefers morning slots".to_string()),
    };
    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, Some(payload)).await);

    assert_eq!(updated.notes.as_deref(), Some("prefers morning slots"));
    assert_eq!(updated.recruiter_notes.as_deref(), Some("strong CV"));
}

#[tokio::test]
async fn record_notes_survive_a_transition_without_application_notes() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .times(1)
        .returning(|id, _| Ok(RemoteApplication::new(id, Shortlisted)));

    let mut record = ApplicationRecord::new("app-15", "job-7", "cand-3", applied_at());
    record.notes = Some("referred by staff".to_string());
    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, None).await);

    assert_eq!(updated.notes.as_deref(), Some("referred by staff"));
}

#[tokio::test]
async fn reject_payload_is_only_valid_for_a_failed_interview() {
    let mut api = MockApi::new();
    api.expect_complete_interview().never();
    api.expect_reject().never();

    let executor = executor(api);
    let record = record_at("app-8", InterviewScheduled);
    let payload = TransitionPayload::reject("late");

    let err = assert_err!(executor.execute(&record, InterviewPassed, Some(payload)).await);
    assert!(matches!(err, WorkflowError::PayloadMismatch { target: InterviewPassed }));

    let blank = TransitionPayload::reject(" ");
    let err = assert_err!(executor.execute(&record, InterviewFailed, Some(blank)).await);
    assert!(matches!(err, WorkflowError::MissingPayload { .. }));
}

#[tokio::test]
async fn skipping_and_backsliding_never_reach_the_backend() {
    let mut api = MockApi::new();
    api.expect_shortlist().never();
    api.expect_schedule_interview().never();
    api.expect_complete_interview().never();

    let executor = executor(api);

    let err = assert_err!(
        executor
            .execute(&record_at("a", Applied), InterviewScheduled, None)
            .await
    );
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    let err = assert_err!(
        executor
            .execute(&record_at("b", InterviewPassed), InterviewScheduled, None)
            .await
    );
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    let err = assert_err!(
        executor
            .execute(&record_at("c", Shortlisted), Shortlisted, None)
            .await
    );
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn collaborator_failure_is_surfaced_and_nothing_changes() {
    let mut api = MockApi::new();
    api.expect_shortlist().times(1).returning(|_, _| {
        Err(CollaboratorError::Rejected {
            status: 503,
            body: "maintenance".to_string(),
        })
    });

    let record = ApplicationRecord::new("app-9", "job-7", "cand-3", applied_at());
    let before = record.clone();
    let err = assert_err!(executor(api).execute(&record, Shortlisted, None).await);

    assert!(matches!(
        err,
        WorkflowError::Collaborator(CollaboratorError::Rejected { status: 503, .. })
    ));
    assert_eq!(record, before);
}

#[tokio::test]
async fn ensure_stage_is_a_no_op_for_the_current_stage() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .times(1)
        .returning(|id, _| Ok(RemoteApplication::new(id, Shortlisted)));
    let executor = executor(api);

    let record = record_at("app-10", Shortlisted);
    let (same, applied) = assert_ok!(executor.ensure_stage(&record, Shortlisted, None).await);
    assert!(!applied);
    assert_eq!(same, record);

    let fresh = ApplicationRecord::new("app-11", "job-7", "cand-3", applied_at());
    let (moved, applied) = assert_ok!(executor.ensure_stage(&fresh, Shortlisted, None).await);
    assert!(applied);
    assert_eq!(moved.stage, Shortlisted);
}

#[tokio::test]
async fn reschedule_replaces_details_without_touching_stage_or_history() {
    let mut api = MockApi::new();
    api.expect_reschedule_interview()
        .times(1)
        .returning(|id, details| {
            assert_eq!(details.time, "16:00");
            Ok(RemoteApplication::new(id, InterviewScheduled))
        });

    let mut record = record_at("app-12", InterviewScheduled);
    record.interview = Some(interview());
    record.interview_scheduled_at = Some(fixed_clock());

    let mut moved = interview();
    moved.time = "16:00".to_string();
    let updated = assert_ok!(executor(api).reschedule(&record, moved.clone()).await);

    assert_eq!(updated.stage, InterviewScheduled);
    assert_eq!(updated.history, record.history);
    assert_eq!(updated.interview, Some(moved));
    assert_eq!(updated.interview_scheduled_at, record.interview_scheduled_at);
}

#[tokio::test]
async fn reschedule_requires_a_scheduled_interview() {
    let mut api = MockApi::new();
    api.expect_reschedule_interview().never();

    let record = record_at("app-13", Shortlisted);
    let err = assert_err!(executor(api).reschedule(&record, interview()).await);
    assert!(matches!(err, WorkflowError::RescheduleNotAllowed { current: Shortlisted }));
}

#[tokio::test]
async fn bulk_failures_are_isolated_per_record() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .times(2)
        .returning(|id, _| Ok(RemoteApplication::new(id, Shortlisted)));

    let records = vec![
        record_at("first", Applied),
        record_at("second", InterviewPassed),
        record_at("third", Applied),
    ];
    let results = executor(api).execute_bulk(&records, Shortlisted, None).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(!results[1].is_ok());
    assert!(results[2].is_ok());
    assert_eq!(results[1].id, "second");
    assert!(matches!(
        results[1].error(),
        Some(WorkflowError::InvalidTransition { .. })
    ));
    assert_eq!(results[2].record().map(|r| r.stage), Some(Shortlisted));
}

#[tokio::test]
async fn bulk_keeps_going_after_a_backend_error() {
    let mut api = MockApi::new();
    api.expect_shortlist().times(3).returning(|id, _| {
        if id == "b" {
            Err(CollaboratorError::Other("timeout".to_string()))
        } else {
            Ok(RemoteApplication::new(id, Shortlisted))
        }
    });

    let records: Vec<_> = ["a", "b", "c"].iter().map(|id| record_at(id, Applied)).collect();
    let results = executor(api)
        .with_bulk_concurrency(2)
        .execute_bulk(&records, Shortlisted, None)
        .await;

    let outcomes: Vec<(&str, bool)> = results.iter().map(|r| (r.id.as_str(), r.is_ok())).collect();
    assert_eq!(outcomes, vec![("a", true), ("b", false), ("c", true)]);
}

/// Answers after a per-application delay encoded in the id (`name-millis`).
struct DelayedApi;

#[async_trait]
impl ApplicationApi for DelayedApi {
    async fn shortlist(
        &self,
        application_id: &str,
        _note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        let millis = application_id
            .rsplit('-')
            .next()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(RemoteApplication::new(application_id, Shortlisted))
    }

    async fn schedule_interview(
        &self,
        _application_id: &str,
        _details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        Err(CollaboratorError::Other("unused".to_string()))
    }

    async fn reschedule_interview(
        &self,
        _application_id: &str,
        _details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        Err(CollaboratorError::Other("unused".to_string()))
    }

    async fn complete_interview(
        &self,
        _application_id: &str,
        _result: InterviewResult,
        _note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        Err(CollaboratorError::Other("unused".to_string()))
    }

    async fn reject(
        &self,
        _application_id: &str,
        _reason: &str,
    ) -> Result<RemoteApplication, CollaboratorError> {
        Err(CollaboratorError::Other("unused".to_string()))
    }
}

#[tokio::test]
async fn concurrent_bulk_returns_results_in_input_order() {
    let executor = TransitionExecutor::new(Arc::new(DelayedApi)).with_bulk_concurrency(3);
    let records: Vec<_> = ["slow-40", "mid-15", "fast-1"]
        .iter()
        .map(|id| record_at(id, Applied))
        .collect();

    let results = executor.execute_bulk(&records, Shortlisted, None).await;
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();

    assert_eq!(ids, vec!["slow-40", "mid-15", "fast-1"]);
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn bulk_run_can_be_spawned_onto_the_runtime() {
    let executor = TransitionExecutor::new(Arc::new(DelayedApi)).with_bulk_concurrency(2);
    let records: Vec<_> = ["one-5", "two-1"].iter().map(|id| record_at(id, Applied)).collect();

    let handle = tokio::spawn(async move {
        executor.execute_bulk(&records, Shortlisted, None).await
    });
    let results = handle.await.expect("bulk task panicked");

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["one-5", "two-1"]);
    assert!(results.iter().all(|r| r.is_ok()));
}

/// Never answers.
struct HangingApi;

#[async_trait]
impl ApplicationApi for HangingApi {
    async fn shortlist(
        &self,
        _application_id: &str,
        _note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        std::future::pending().await
    }

    async fn schedule_interview(
        &self,
        _application_id: &str,
        _details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        std::future::pending().await
    }

    async fn reschedule_interview(
        &self,
        _application_id: &str,
        _details: &InterviewDetails,
    ) -> Result<RemoteApplication, CollaboratorError> {
        std::future::pending().await
    }

    async fn complete_interview(
        &self,
        _application_id: &str,
        _result: InterviewResult,
        _note: Option<String>,
    ) -> Result<RemoteApplication, CollaboratorError> {
        std::future::pending().await
    }

    async fn reject(
        &self,
        _application_id: &str,
        _reason: &str,
    ) -> Result<RemoteApplication, CollaboratorError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn cancelled_transition_leaves_the_record_untouched() {
    let executor = TransitionExecutor::new(Arc::new(HangingApi));
    let record = ApplicationRecord::new("app-14", "job-7", "cand-3", applied_at());
    let before = record.clone();

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        executor.execute(&record, Shortlisted, None),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(record, before);
}

#[tokio::test]
async fn stamps_never_run_behind_recorded_activity() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .returning(|id, _| Ok(RemoteApplication::new(id, Shortlisted)));

    let future_applied = Utc.with_ymd_and_hms(2030, 3, 1, 12, 0, 0).unwrap();
    let record = ApplicationRecord::new("app-15", "job-7", "cand-3", future_applied);

    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, None).await);
    assert_eq!(updated.shortlisted_at, Some(future_applied));
    assert!(updated.history[1].entered_at >= updated.history[0].entered_at);
    assert!(updated.is_consistent());
}

#[tokio::test]
async fn existing_timestamps_are_not_overwritten() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .returning(|id, _| Ok(RemoteApplication::new(id, Shortlisted)));

    let earlier = Utc.with_ymd_and_hms(2025, 1, 7, 10, 0, 0).unwrap();
    let mut record = ApplicationRecord::new("app-16", "job-7", "cand-3", applied_at());
    record.shortlisted_at = Some(earlier);

    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, None).await);
    assert_eq!(updated.shortlisted_at, Some(earlier));
}

#[tokio::test]
async fn backend_stage_drift_does_not_fail_the_transition() {
    let mut api = MockApi::new();
    api.expect_shortlist()
        .returning(|id, _| Ok(RemoteApplication::new(id, InterviewScheduled)));

    let record = ApplicationRecord::new("app-17", "job-7", "cand-3", applied_at());
    let updated = assert_ok!(executor(api).execute(&record, Shortlisted, None).await);
    assert_eq!(updated.stage, Shortlisted);
}
