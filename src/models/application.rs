use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::interview::InterviewDetails;
use crate::models::stage::ApplicationStage;
use crate::models::transition::TimestampField;

/// A job application as seen by the workflow core. The caller owns the
/// record; transitions borrow it and hand back an updated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationRecord {
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub stage: ApplicationStage,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub shortlisted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decision_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recruiter_notes: Option<String>,
    #[serde(default)]
    pub interview: Option<InterviewDetails>,
    #[serde(default)]
    pub history: Vec<StageHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StageHistoryEntry {
    pub stage: ApplicationStage,
    pub entered_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ApplicationRecord {
    pub fn new(
        id: impl Into<String>,
        job_id: impl Into<String>,
        candidate_id: impl Into<String>,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            candidate_id: candidate_id.into(),
            stage: ApplicationStage::Applied,
            applied_at,
            shortlisted_at: None,
            interview_scheduled_at: None,
            interview_completed_at: None,
            decision_at: None,
            notes: None,
            recruiter_notes: None,
            interview: None,
            history: vec![StageHistoryEntry {
                stage: ApplicationStage::Applied,
                entered_at: applied_at,
                note: None,
            }],
        }
    }

    pub fn timestamp(&self, field: TimestampField) -> Option<DateTime<Utc>> {
        match field {
            TimestampField::ShortlistedAt => self.shortlisted_at,
            TimestampField::InterviewScheduledAt => self.interview_scheduled_at,
            TimestampField::InterviewCompletedAt => self.interview_completed_at,
            TimestampField::DecisionAt => self.decision_at,
        }
    }

    pub(crate) fn timestamp_slot(&mut self, field: TimestampField) -> &mut Option<DateTime<Utc>> {
        match field {
            TimestampField::ShortlistedAt => &mut self.shortlisted_at,
            TimestampField::InterviewScheduledAt => &mut self.interview_scheduled_at,
            TimestampField::InterviewCompletedAt => &mut self.interview_completed_at,
            TimestampField::DecisionAt => &mut self.decision_at,
        }
    }

    /// Latest moment recorded anywhere on the record; new stamps never go below it.
    pub fn latest_activity(&self) -> DateTime<Utc> {
        TimestampField::ALL
            .iter()
            .filter_map(|field| self.timestamp(*field))
            .chain(self.history.iter().map(|entry| entry.entered_at))
            .fold(self.applied_at, |latest, at| latest.max(at))
    }

    pub fn last_entry(&self) -> Option<&StageHistoryEntry> {
        self.history.last()
    }

    /// `stage` matches the newest history entry and stage timestamps never run backwards.
    pub fn is_consistent(&self) -> bool {
        let stage_matches = self
            .last_entry()
            .map(|entry| entry.stage == self.stage)
            .unwrap_or(false);

        let mut floor = self.applied_at;
        let ordered = TimestampField::ALL.iter().all(|field| match self.timestamp(*field) {
            Some(at) if at < floor => false,
            Some(at) => {
                floor = at;
                true
            }
            None => true,
        });

        stage_matches && ordered
    }

    /// Repairs a record whose history is empty or lags behind `stage`.
    /// `stage` is authoritative, so the missing entry is appended rather
    /// than the stage being rolled back.
    pub fn reconciled(mut self) -> Self {
        let lagging = self
            .last_entry()
            .map(|entry| entry.stage != self.stage)
            .unwrap_or(true);

        if lagging {
            let entered_at = self.latest_activity();
            self.history.push(StageHistoryEntry {
                stage: self.stage,
                entered_at,
                note: None,
            });
        }
        self
    }
}
