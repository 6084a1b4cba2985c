use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::application::{ApplicationRecord, StageHistoryEntry};
use crate::models::interview::{InterviewDetails, InterviewResult};
use crate::models::stage::ApplicationStage;
use crate::models::transition::{PayloadRequirement, SideEffect, StageTransition, TransitionPayload};
use crate::services::application_api::{ApplicationApi, RemoteApplication};
use crate::services::{transition_rules, transition_validator};
use crate::utils::{time, validation};

/// Outcome for one record of a bulk transition.
#[derive(Debug)]
pub struct BulkResult {
    pub id: String,
    pub outcome: WorkflowResult<ApplicationRecord>,
}

impl BulkResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn record(&self) -> Option<&ApplicationRecord> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.outcome.as_ref().err()
    }
}

/// Drives an application through the interview pipeline, calling the
/// backend for every move and returning the updated record.
#[derive(Clone)]
pub struct TransitionExecutor {
    api: Arc<dyn ApplicationApi>,
    clock: fn() -> DateTime<Utc>,
    bulk_concurrency: usize,
}

impl TransitionExecutor {
    pub fn new(api: Arc<dyn ApplicationApi>) -> Self {
        Self {
            api,
            clock: time::now,
            bulk_concurrency: 1,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of bulk items allowed in flight at once; 1 runs them in order.
    pub fn with_bulk_concurrency(mut self, limit: usize) -> Self {
        self.bulk_concurrency = limit.max(1);
        self
    }

    pub fn bulk_concurrency(&self) -> usize {
        self.bulk_concurrency
    }

    /// Moves `record` to `target`.
    ///
    /// The caller's record is only read. Every check runs before the backend
    /// is contacted, and the returned record is built only after the backend
    /// call succeeds, so a failed or cancelled call leaves nothing half-applied.
    pub async fn execute(
        &self,
        record: &ApplicationRecord,
        target: ApplicationStage,
        payload: Option<TransitionPayload>,
    ) -> WorkflowResult<ApplicationRecord> {
        let transition = transition_validator::ensure_valid(record.stage, target)?;
        let application_notes = payload
            .as_ref()
            .and_then(TransitionPayload::application_notes)
            .map(str::to_string);
        let call = prepare_call(transition, payload)?;

        let remote = self.invoke(&record.id, &call).await?;
        warn_on_drift(&record.id, target, &remote);

        Ok(self.apply(record, transition, call, application_notes))
    }

    /// Caller-level idempotent move: a record already at `target` comes back
    /// unchanged instead of being rejected as a self-transition.
    pub async fn ensure_stage(
        &self,
        record: &ApplicationRecord,
        target: ApplicationStage,
        payload: Option<TransitionPayload>,
    ) -> WorkflowResult<(ApplicationRecord, bool)> {
        if record.stage == target {
            return Ok((record.clone(), false));
        }
        self.execute(record, target, payload).await.map(|updated| (updated, true))
    }

    /// Replaces the interview details of a scheduled interview. Stage,
    /// history and the original scheduling timestamp are left alone.
    pub async fn reschedule(
        &self,
        record: &ApplicationRecord,
        details: InterviewDetails,
    ) -> WorkflowResult<ApplicationRecord> {
        if record.stage != ApplicationStage::InterviewScheduled {
            return Err(WorkflowError::RescheduleNotAllowed {
                current: record.stage,
            });
        }
        check_interview_details(&details)?;

        let remote = self.api.reschedule_interview(&record.id, &details).await?;
        warn_on_drift(&record.id, ApplicationStage::InterviewScheduled, &remote);

        let mut updated = record.clone().reconciled();
        if let Some(note) = details.notes.clone() {
            updated.recruiter_notes = Some(note);
        }
        updated.interview = Some(details);

        tracing::info!(application_id = %record.id, "interview rescheduled");
        Ok(updated)
    }

    /// Applies the same move to every record. One failure never stops the
    /// others; results come back in input order.
    pub async fn execute_bulk(
        &self,
        records: &[ApplicationRecord],
        target: ApplicationStage,
        payload: Option<TransitionPayload>,
    ) -> Vec<BulkResult> {
        let calls: Vec<_> = records
            .iter()
            .map(|record| {
                let payload = payload.clone();
                async move {
                    BulkResult {
                        id: record.id.clone(),
                        outcome: self.execute(record, target, payload).await,
                    }
                }
            })
            .collect();

        stream::iter(calls)
            .buffered(self.bulk_concurrency)
            .collect()
            .await
    }

    async fn invoke(
        &self,
        application_id: &str,
        call: &PreparedCall,
    ) -> WorkflowResult<RemoteApplication> {
        let remote = match call {
            PreparedCall::Shortlist { note } => self.api.shortlist(application_id, note.clone()).await?,
            PreparedCall::ScheduleInterview { details } => {
                self.api.schedule_interview(application_id, details).await?
            }
            PreparedCall::CompleteInterview { result, note } => {
                self.api
                    .complete_interview(application_id, *result, note.clone())
                    .await?
            }
            PreparedCall::Reject { reason } => self.api.reject(application_id, reason).await?,
        };
        Ok(remote)
    }

    fn apply(
        &self,
        record: &ApplicationRecord,
        transition: &StageTransition,
        call: PreparedCall,
        application_notes: Option<String>,
    ) -> ApplicationRecord {
        let mut updated = record.clone().reconciled();
        let entered_at = time::not_before((self.clock)(), updated.latest_activity());

        for field in transition_rules::timestamps_for(transition.to) {
            let slot = updated.timestamp_slot(*field);
            if slot.is_none() {
                *slot = Some(entered_at);
            }
        }

        let side_effect = call.side_effect();
        let note = call.note().map(str::to_string);
        if let Some(text) = &note {
            updated.recruiter_notes = Some(text.clone());
        }
        if application_notes.is_some() {
            updated.notes = application_notes;
        }
        if let PreparedCall::ScheduleInterview { details } = call {
            updated.interview = Some(details);
        }

        updated.stage = transition.to;
        updated.history.push(StageHistoryEntry {
            stage: transition.to,
            entered_at,
            note,
        });

        tracing::info!(
            application_id = %updated.id,
            from = %transition.from,
            to = %transition.to,
            side_effect = side_effect.name(),
            "stage transition applied"
        );
        updated
    }
}

/// Collaborator call resolved from a transition and its payload.
enum PreparedCall {
    Shortlist { note: Option<String> },
    ScheduleInterview { details: InterviewDetails },
    CompleteInterview { result: InterviewResult, note: Option<String> },
    Reject { reason: String },
}

impl PreparedCall {
    fn side_effect(&self) -> SideEffect {
        match self {
            PreparedCall::Shortlist { .. } => SideEffect::Shortlist,
            PreparedCall::ScheduleInterview { .. } => SideEffect::ScheduleInterview,
            PreparedCall::CompleteInterview { result, .. } => SideEffect::CompleteInterview(*result),
            PreparedCall::Reject { .. } => SideEffect::Reject,
        }
    }

    fn note(&self) -> Option<&str> {
        match self {
            PreparedCall::Shortlist { note } | PreparedCall::CompleteInterview { note, .. } => {
                note.as_deref()
            }
            PreparedCall::ScheduleInterview { details } => details.notes.as_deref(),
            PreparedCall::Reject { reason } => Some(reason.as_str()),
        }
    }
}

/// Matches the payload against what the transition needs. A failed
/// interview may be closed either as a recorded outcome or as an explicit
/// rejection with a reason.
fn prepare_call(
    transition: &StageTransition,
    payload: Option<TransitionPayload>,
) -> WorkflowResult<PreparedCall> {
    let target = transition.to;

    if transition.required_payload == PayloadRequirement::InterviewDetails {
        return match payload {
            Some(TransitionPayload::ScheduleInterview { details, .. }) => {
                check_interview_details(&details)?;
                Ok(PreparedCall::ScheduleInterview { details })
            }
            None => Err(WorkflowError::MissingPayload {
                missing_fields: InterviewDetails::REQUIRED_FIELDS
                    .iter()
                    .map(|field| field.to_string())
                    .collect(),
            }),
            Some(_) => Err(WorkflowError::PayloadMismatch { target }),
        };
    }

    match (transition.side_effect, payload) {
        (SideEffect::Shortlist, None) => Ok(PreparedCall::Shortlist { note: None }),
        (SideEffect::Shortlist, Some(TransitionPayload::Shortlist { note, .. })) => {
            Ok(PreparedCall::Shortlist { note })
        }
        (SideEffect::CompleteInterview(result), None) => {
            Ok(PreparedCall::CompleteInterview { result, note: None })
        }
        (SideEffect::CompleteInterview(result), Some(TransitionPayload::InterviewOutcome { note, .. })) => {
            Ok(PreparedCall::CompleteInterview { result, note })
        }
        (
            SideEffect::CompleteInterview(InterviewResult::Failed),
            Some(TransitionPayload::Reject { reason, .. }),
        ) => {
            if reason.trim().is_empty() {
                return Err(WorkflowError::MissingPayload {
                    missing_fields: vec!["reason".to_string()],
                });
            }
            Ok(PreparedCall::Reject { reason })
        }
        _ => Err(WorkflowError::PayloadMismatch { target }),
    }
}

fn check_interview_details(details: &InterviewDetails) -> WorkflowResult<()> {
    let missing = details.missing_fields();
    if !missing.is_empty() {
        return Err(WorkflowError::MissingPayload {
            missing_fields: missing.into_iter().map(str::to_string).collect(),
        });
    }
    validation::validate(details)?;
    Ok(())
}

fn warn_on_drift(application_id: &str, expected: ApplicationStage, remote: &RemoteApplication) {
    match remote.stage() {
        Some(Ok(reported)) if reported != expected => {
            tracing::warn!(
                application_id,
                expected = %expected,
                reported = %reported,
                "backend reported a different stage than the one applied"
            );
        }
        Some(Err(_)) => {
            tracing::warn!(
                application_id,
                status = remote.status.as_deref().unwrap_or_default(),
                "backend reported an unrecognised stage token"
            );
        }
        _ => {}
    }
}
