//! Attachment-style questionnaire scoring.
//!
//! [`scoring`] holds the engine: rule-table validation, answer normalization, scoring,
//! and ranking. [`submissions`] wraps it with name checks, a repository seam, and
//! result views for callers that store and display submissions.

pub mod config;
pub mod error;
pub mod scoring;
pub mod submissions;
pub mod telemetry;
