use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::interview::{InterviewDetails, InterviewResult};
use crate::models::stage::ApplicationStage;

/// One edge of the interview pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub from: ApplicationStage,
    pub to: ApplicationStage,
    pub required_payload: PayloadRequirement,
    pub side_effect: SideEffect,
    /// Marks the deterministic forward successor when a stage branches.
    pub default_successor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRequirement {
    None,
    InterviewDetails,
}

/// Collaborator operation invoked when a transition is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    Shortlist,
    ScheduleInterview,
    CompleteInterview(InterviewResult),
    Reject,
}

impl SideEffect {
    pub const fn name(self) -> &'static str {
        match self {
            SideEffect::Shortlist => "shortlist",
            SideEffect::ScheduleInterview => "schedule_interview",
            SideEffect::CompleteInterview(InterviewResult::Passed) => "complete_interview_passed",
            SideEffect::CompleteInterview(InterviewResult::Failed) => "complete_interview_failed",
            SideEffect::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampField {
    ShortlistedAt,
    InterviewScheduledAt,
    InterviewCompletedAt,
    DecisionAt,
}

impl TimestampField {
    /// Pipeline order; stamps must be non-decreasing along it.
    pub const ALL: [TimestampField; 4] = [
        TimestampField::ShortlistedAt,
        TimestampField::InterviewScheduledAt,
        TimestampField::InterviewCompletedAt,
        TimestampField::DecisionAt,
    ];
}

/// Data accompanying a transition, one variant per kind of move.
///
/// `application_notes` replaces the record's free-text `notes` when set.
/// `note` and `reason` end up in `recruiter_notes` and the history entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionPayload {
    Shortlist {
        note: Option<String>,
        application_notes: Option<String>,
    },
    ScheduleInterview {
        details: InterviewDetails,
        application_notes: Option<String>,
    },
    InterviewOutcome {
        note: Option<String>,
        application_notes: Option<String>,
    },
    Reject {
        reason: String,
        application_notes: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoteBody {
    note: Option<String>,
    application_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScheduleBody {
    #[serde(flatten)]
    details: InterviewDetails,
    application_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutcomeBody {
    kind: Option<String>,
    note: Option<String>,
    reason: Option<String>,
    application_notes: Option<String>,
}

impl TransitionPayload {
    pub fn schedule(details: InterviewDetails) -> Self {
        TransitionPayload::ScheduleInterview {
            details,
            application_notes: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        TransitionPayload::Reject {
            reason: reason.into(),
            application_notes: None,
        }
    }

    pub fn application_notes(&self) -> Option<&str> {
        match self {
            TransitionPayload::Shortlist { application_notes, .. }
            | TransitionPayload::ScheduleInterview { application_notes, .. }
            | TransitionPayload::InterviewOutcome { application_notes, .. }
            | TransitionPayload::Reject { application_notes, .. } => application_notes.as_deref(),
        }
    }

    /// Reads a raw request body as the payload of a move into `target`.
    ///
    /// The target decides the shape: interview scheduling takes the
    /// interview fields directly, the other moves take an optional `note`.
    /// On the failed branch `"kind": "reject"` with a `reason` selects an
    /// explicit rejection instead of a recorded outcome. Absent fields are
    /// left blank so the executor can name them.
    pub fn for_target(target: ApplicationStage, body: Option<Value>) -> WorkflowResult<Option<Self>> {
        let body = match body {
            None | Some(Value::Null) => return Ok(None),
            Some(body) => body,
        };

        let payload = match target {
            ApplicationStage::Shortlisted => {
                let body: NoteBody = parse_body(target, body)?;
                TransitionPayload::Shortlist {
                    note: body.note,
                    application_notes: body.application_notes,
                }
            }
            ApplicationStage::InterviewScheduled => {
                let body: ScheduleBody = parse_body(target, body)?;
                TransitionPayload::ScheduleInterview {
                    details: body.details,
                    application_notes: body.application_notes,
                }
            }
            ApplicationStage::InterviewPassed => {
                let body: NoteBody = parse_body(target, body)?;
                TransitionPayload::InterviewOutcome {
                    note: body.note,
                    application_notes: body.application_notes,
                }
            }
            ApplicationStage::InterviewFailed => {
                let body: OutcomeBody = parse_body(target, body)?;
                match body.kind.as_deref().map(str::trim) {
                    None | Some("") | Some("interview_outcome") => TransitionPayload::InterviewOutcome {
                        note: body.note,
                        application_notes: body.application_notes,
                    },
                    Some("reject") => TransitionPayload::Reject {
                        reason: body.reason.unwrap_or_default(),
                        application_notes: body.application_notes,
                    },
                    Some(other) => {
                        return Err(WorkflowError::MalformedPayload {
                            target,
                            reason: format!("unknown payload kind '{}'", other),
                        })
                    }
                }
            }
            ApplicationStage::Applied | ApplicationStage::Withdrawn => return Ok(None),
        };
        Ok(Some(payload))
    }
}

fn parse_body<T: DeserializeOwned>(target: ApplicationStage, body: Value) -> WorkflowResult<T> {
    serde_json::from_value(body).map_err(|e| WorkflowError::MalformedPayload {
        target,
        reason: e.to_string(),
    })
}
