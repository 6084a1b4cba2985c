use std::collections::BTreeSet;

use crate::models::interview::InterviewResult;
use crate::models::stage::ApplicationStage;
use crate::models::transition::{PayloadRequirement, SideEffect, StageTransition, TimestampField};

use ApplicationStage::*;

/// The only rule table for the interview pipeline.
const TRANSITIONS: [StageTransition; 4] = [
    StageTransition {
        from: Applied,
        to: Shortlisted,
        required_payload: PayloadRequirement::None,
        side_effect: SideEffect::Shortlist,
        default_successor: true,
    },
    StageTransition {
        from: Shortlisted,
        to: InterviewScheduled,
        required_payload: PayloadRequirement::InterviewDetails,
        side_effect: SideEffect::ScheduleInterview,
        default_successor: true,
    },
    StageTransition {
        from: InterviewScheduled,
        to: InterviewPassed,
        required_payload: PayloadRequirement::None,
        side_effect: SideEffect::CompleteInterview(InterviewResult::Passed),
        default_successor: true,
    },
    StageTransition {
        from: InterviewScheduled,
        to: InterviewFailed,
        required_payload: PayloadRequirement::None,
        side_effect: SideEffect::CompleteInterview(InterviewResult::Failed),
        default_successor: false,
    },
];

pub fn transitions() -> &'static [StageTransition] {
    &TRANSITIONS
}

pub fn find(from: ApplicationStage, to: ApplicationStage) -> Option<&'static StageTransition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

pub fn next_stage(current: ApplicationStage) -> Option<ApplicationStage> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == current && t.default_successor)
        .map(|t| t.to)
}

pub fn branches_from(current: ApplicationStage) -> BTreeSet<ApplicationStage> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == current)
        .map(|t| t.to)
        .collect()
}

pub fn is_terminal(stage: ApplicationStage) -> bool {
    !TRANSITIONS.iter().any(|t| t.from == stage)
}

/// Which record timestamps a successful move into `target` stamps.
pub fn timestamps_for(target: ApplicationStage) -> &'static [TimestampField] {
    match target {
        Shortlisted => &[TimestampField::ShortlistedAt],
        InterviewScheduled => &[TimestampField::InterviewScheduledAt],
        InterviewPassed | InterviewFailed => &[
            TimestampField::InterviewCompletedAt,
            TimestampField::DecisionAt,
        ],
        Applied | Withdrawn => &[],
    }
}
