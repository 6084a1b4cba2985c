use crate::error::{WorkflowError, WorkflowResult};
use crate::models::stage::{ApplicationStage, StageConvention};

/// Resolves any accepted spelling of a stage to its canonical value.
///
/// Accepts the hyphenated tokens used by the UI layer, the underscored
/// tokens used by the backend API, and a handful of legacy aliases.
/// Matching ignores surrounding whitespace and ASCII case.
pub fn to_canonical(token: &str) -> WorkflowResult<ApplicationStage> {
    let normalized = token.trim().to_ascii_lowercase();
    let stage = match normalized.as_str() {
        "applied" | "new" => ApplicationStage::Applied,
        "shortlisted" => ApplicationStage::Shortlisted,
        "interview-scheduled"
        | "interview_scheduled"
        | "interview_rescheduled"
        | "interview-rescheduled"
        | "scheduled"
        | "rescheduled" => ApplicationStage::InterviewScheduled,
        "interview-passed" | "interview_passed" | "passed" => ApplicationStage::InterviewPassed,
        "interview-failed" | "interview_failed" | "failed" | "rejected" => {
            ApplicationStage::InterviewFailed
        }
        "withdrawn" => ApplicationStage::Withdrawn,
        _ => {
            return Err(WorkflowError::UnknownStage {
                token: token.to_string(),
            })
        }
    };
    Ok(stage)
}

pub fn to_external_format(stage: ApplicationStage, convention: StageConvention) -> &'static str {
    match convention {
        StageConvention::Hyphenated => stage.as_str(),
        StageConvention::Underscored => match stage {
            ApplicationStage::Applied => "applied",
            ApplicationStage::Shortlisted => "shortlisted",
            ApplicationStage::InterviewScheduled => "interview_scheduled",
            ApplicationStage::InterviewPassed => "interview_passed",
            ApplicationStage::InterviewFailed => "interview_failed",
            ApplicationStage::Withdrawn => "withdrawn",
        },
    }
}

pub fn is_valid(token: &str) -> bool {
    to_canonical(token).is_ok()
}

/// Re-spells a token from one convention into another.
pub fn convert(token: &str, convention: StageConvention) -> WorkflowResult<&'static str> {
    to_canonical(token).map(|stage| to_external_format(stage, convention))
}
