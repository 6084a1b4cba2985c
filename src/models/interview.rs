use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_INTERVIEW_MINUTES: u32 = 60;

/// Scheduling data attached to an application when it enters
/// `interview-scheduled`. Missing keys deserialize to blanks so the
/// executor can name every absent field instead of failing on the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct InterviewDetails {
    /// Calendar date, `YYYY-MM-DD`.
    #[validate(custom(function = "crate::utils::validation::iso_date"))]
    pub date: String,
    /// Local start time, `HH:MM`.
    #[validate(custom(function = "crate::utils::validation::clock_time"))]
    pub time: String,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: u32,
    pub location: String,
    pub contact_person: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub required_documents: BTreeSet<String>,
    pub notes: Option<String>,
}

impl InterviewDetails {
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["date", "time", "location"];

    pub fn new(date: impl Into<String>, time: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    /// Required scheduling fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [&self.date, &self.time, &self.location];
        Self::REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Default for InterviewDetails {
    fn default() -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            duration_minutes: DEFAULT_INTERVIEW_MINUTES,
            location: String::new(),
            contact_person: None,
            required_documents: BTreeSet::new(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InterviewResult {
    Passed,
    Failed,
}

impl InterviewResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            InterviewResult::Passed => "passed",
            InterviewResult::Failed => "failed",
        }
    }
}
