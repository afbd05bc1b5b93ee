//! Attachment-style scoring engine.
//!
//! A [`RuleTable`] is validated once, up front. Each submission is then normalized,
//! scored against every question, and ranked.

pub mod domain;
pub mod engine;
pub mod normalizer;
pub mod ranking;
pub mod rules;

pub use domain::{
    AnswerChoice, AnswerSet, Category, PointMap, QuestionId, QuestionRule, Score, MAX_CONTRIBUTION,
    TOTAL_QUESTIONS,
};
pub use engine::{score_answer_set, score_answers, ScoredAnswers, ScoringEngine, ScoringError};
pub use normalizer::{normalize_answers, normalize_value};
pub use ranking::{rank, Ranking};
pub use rules::{MalformedRuleTable, RuleSourceError, RuleTable};
