use serde_json::{Map, Value};

use super::domain::{AnswerChoice, AnswerSet, QuestionId};

/// Keeps only entries with an in-range question key and a value of exactly `1` or `2`.
///
/// Drafts routinely carry half-filled or stale state, so invalid entries are dropped
/// rather than reported. Completeness is checked by the scorer.
pub fn normalize_answers(raw: &Map<String, Value>) -> AnswerSet {
    raw.iter()
        .filter_map(|(key, value)| Some((parse_question_key(key)?, parse_choice(value)?)))
        .collect()
}

/// Same as [`normalize_answers`]; anything other than a JSON object yields an empty set.
pub fn normalize_value(raw: &Value) -> AnswerSet {
    match raw {
        Value::Object(map) => normalize_answers(map),
        _ => AnswerSet::new(),
    }
}

fn parse_question_key(key: &str) -> Option<QuestionId> {
    let number: f64 = key.trim().parse().ok()?;
    if !number.is_finite() || number.fract() != 0.0 || !(1.0..=255.0).contains(&number) {
        return None;
    }
    QuestionId::new(number as u8)
}

fn parse_choice(value: &Value) -> Option<AnswerChoice> {
    match value.as_u64()? {
        1 => Some(AnswerChoice::First),
        2 => Some(AnswerChoice::Second),
        _ => None,
    }
}
