use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{format_datetime_jst, RespondentName, SubmissionId, ViewedPeriod};
use crate::scoring::{rank, AnswerSet, Score};

/// Stored submission: normalized answers, their score, and intake metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub name: RespondentName,
    pub answers: AnswerSet,
    pub score: Score,
    pub created_at: DateTime<Utc>,
    pub viewed_at: DateTime<Utc>,
    #[serde(default)]
    pub viewed_period: ViewedPeriod,
}

impl SubmissionRecord {
    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            id: self.id.clone(),
            name: self.name.to_string(),
            created_at: format_datetime_jst(self.created_at),
            viewed_at: format_datetime_jst(self.viewed_at),
            viewed_period: self.viewed_period.label(),
            primary_label: rank(&self.score).primary().label(),
            score: self.score,
        }
    }
}

/// Storage abstraction; the service never sees the underlying persistence format.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
    /// Newest first by `created_at`.
    fn recent(&self, limit: usize) -> Result<Vec<SubmissionRecord>, RepositoryError>;
    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row shown in the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub id: SubmissionId,
    pub name: String,
    pub created_at: String,
    pub viewed_at: String,
    pub viewed_period: &'static str,
    pub primary_label: &'static str,
    pub score: Score,
}
