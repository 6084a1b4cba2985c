use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::WorkflowError;
use crate::services::stage_vocabulary;

/// Canonical pipeline position of an application. Internal logic only ever
/// sees these values; spelling conventions are handled at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStage {
    Applied,
    Shortlisted,
    InterviewScheduled,
    InterviewPassed,
    InterviewFailed,
    Withdrawn,
}

impl ApplicationStage {
    pub const ALL: [ApplicationStage; 6] = [
        ApplicationStage::Applied,
        ApplicationStage::Shortlisted,
        ApplicationStage::InterviewScheduled,
        ApplicationStage::InterviewPassed,
        ApplicationStage::InterviewFailed,
        ApplicationStage::Withdrawn,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStage::Applied => "applied",
            ApplicationStage::Shortlisted => "shortlisted",
            ApplicationStage::InterviewScheduled => "interview-scheduled",
            ApplicationStage::InterviewPassed => "interview-passed",
            ApplicationStage::InterviewFailed => "interview-failed",
            ApplicationStage::Withdrawn => "withdrawn",
        }
    }

    /// Human readable label used in diagnostics shown to recruiters.
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStage::Applied => "Applied",
            ApplicationStage::Shortlisted => "Shortlisted",
            ApplicationStage::InterviewScheduled => "Interview Scheduled",
            ApplicationStage::InterviewPassed => "Interview Passed",
            ApplicationStage::InterviewFailed => "Interview Failed",
            ApplicationStage::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStage {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        stage_vocabulary::to_canonical(s)
    }
}

impl<'de> Deserialize<'de> for ApplicationStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        stage_vocabulary::to_canonical(&raw).map_err(serde::de::Error::custom)
    }
}

/// Spelling conventions used by the different API layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageConvention {
    #[default]
    Hyphenated,
    Underscored,
}

impl StageConvention {
    pub const ALL: [StageConvention; 2] = [StageConvention::Hyphenated, StageConvention::Underscored];
}
