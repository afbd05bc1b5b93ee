use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Longest respondent name accepted, in characters.
pub const MAX_NAME_CHARS: usize = 60;

const JST_OFFSET_HOURS: i64 = 9;

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a save request: who answered, plus the raw answer object.
///
/// `answers` is kept as untyped JSON so malformed draft entries reach the normalizer
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub name: String,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

/// Trimmed, length-checked respondent name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RespondentName(String);

impl RespondentName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        if trimmed.chars().count() > MAX_NAME_CHARS {
            return Err(NameError::TooLong {
                max: MAX_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RespondentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name must be at most {max} characters")]
    TooLong { max: usize },
}

/// Time-of-day bucket, in Japan time, at which a result was viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewedPeriod {
    Morning,
    Daytime,
    Evening,
    LateNight,
    #[default]
    Unknown,
}

impl ViewedPeriod {
    pub fn for_instant(instant: DateTime<Utc>) -> Self {
        match japan_time(instant).hour() {
            5..=10 => ViewedPeriod::Morning,
            11..=16 => ViewedPeriod::Daytime,
            17..=21 => ViewedPeriod::Evening,
            _ => ViewedPeriod::LateNight,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewedPeriod::Morning => "朝",
            ViewedPeriod::Daytime => "昼",
            ViewedPeriod::Evening => "夕方〜夜",
            ViewedPeriod::LateNight => "深夜",
            ViewedPeriod::Unknown => "不明",
        }
    }
}

/// Formats an instant the way the admin views display it, e.g. `2025/10/3 9:05:07`.
pub fn format_datetime_jst(instant: DateTime<Utc>) -> String {
    japan_time(instant)
        .format("%Y/%-m/%-d %-H:%M:%S")
        .to_string()
}

fn japan_time(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::hours(JST_OFFSET_HOURS)
}
