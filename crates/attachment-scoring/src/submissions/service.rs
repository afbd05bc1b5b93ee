use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{NameError, RespondentName, SubmissionId, SubmissionPayload, ViewedPeriod};
use super::repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
use crate::scoring::{normalize_answers, RuleTable, ScoringEngine, ScoringError};

/// Row cap for the admin listing.
pub const DEFAULT_RECENT_LIMIT: usize = 200;

/// Service composing the scoring engine with a submission repository.
pub struct SubmissionService<R> {
    engine: ScoringEngine,
    repository: Arc<R>,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:06}"))
}

impl<R> SubmissionService<R>
where
    R: SubmissionRepository + 'static,
{
    /// The rule table must already be validated; the service never loads rules itself.
    pub fn new(rules: Arc<RuleTable>, repository: Arc<R>) -> Self {
        Self {
            engine: ScoringEngine::new(rules),
            repository,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Validate, score, and persist a submission.
    pub fn submit(
        &self,
        payload: SubmissionPayload,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        self.submit_at(payload, Utc::now())
    }

    /// Same as [`SubmissionService::submit`] with an explicit clock reading.
    pub fn submit_at(
        &self,
        payload: SubmissionPayload,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        let name = RespondentName::parse(&payload.name)?;
        let answers = normalize_answers(&payload.answers);

        let scored = self.engine.score(&answers).inspect_err(|err| {
            warn!(answered = answers.len(), error = %err, "submission rejected");
        })?;

        let record = SubmissionRecord {
            id: next_submission_id(),
            name,
            answers,
            score: scored.score,
            created_at: now,
            viewed_at: now,
            viewed_period: ViewedPeriod::for_instant(now),
        };

        let stored = self.repository.insert(record)?;
        info!(
            id = %stored.id,
            primary = %scored.ranking.primary(),
            period = stored.viewed_period.label(),
            "submission stored"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &SubmissionId) -> Result<SubmissionRecord, SubmissionServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<SubmissionRecord>, SubmissionServiceError> {
        Ok(self.repository.recent(limit)?)
    }

    pub fn delete(&self, id: &SubmissionId) -> Result<(), SubmissionServiceError> {
        self.repository.delete(id)?;
        info!(%id, "submission deleted");
        Ok(())
    }
}

/// Error raised by the submission service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionServiceError {
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
