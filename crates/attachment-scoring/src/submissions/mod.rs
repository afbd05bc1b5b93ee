//! Submission intake: name validation, scoring, persistence hand-off, and result views.

pub mod domain;
pub mod report;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    format_datetime_jst, NameError, RespondentName, SubmissionId, SubmissionPayload,
    ViewedPeriod, MAX_NAME_CHARS,
};
pub use report::{
    answer_lines, AnswerLine, ResultView, ScoreRow, Strength, TraitView,
    DEFAULT_SECONDARY_THRESHOLD,
};
pub use repository::{RepositoryError, SubmissionRecord, SubmissionRepository, SubmissionSummary};
pub use service::{SubmissionService, SubmissionServiceError, DEFAULT_RECENT_LIMIT};
