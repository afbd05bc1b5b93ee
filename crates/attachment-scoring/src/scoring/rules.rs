use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use tracing::info;

use super::domain::{
    contribution_in_range, AnswerChoice, Category, PointMap, QuestionId, QuestionRule,
    TOTAL_QUESTIONS,
};

const BUNDLED_RULES: &str = include_str!("../../data/attachment-style-rules.json");

/// Structural problems detected while validating a rule table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRuleTable {
    #[error("rule table must contain an object of questions")]
    MalformedQuestions,
    #[error("no scoring rule for question {question}")]
    MissingRule { question: u8 },
    #[error("rule table references unknown question '{key}'")]
    UnexpectedQuestion { key: String },
    #[error("question {question} is defined more than once")]
    DuplicateRule { question: u8 },
    #[error("rule for question {question} must be an object with answer1 and answer2")]
    MalformedRule { question: u8 },
    #[error("question {question} {choice} must be an object of category points")]
    MalformedPointMap { question: u8, choice: AnswerChoice },
    #[error("question {question} {choice} uses unknown category key '{key}'")]
    UnknownCategoryKey {
        question: u8,
        choice: AnswerChoice,
        key: String,
    },
    #[error("question {question} {choice} has invalid contribution for {category}: {value}")]
    InvalidContribution {
        question: u8,
        choice: AnswerChoice,
        category: Category,
        value: String,
    },
}

/// Failure to obtain a rule table from its source.
#[derive(Debug, thiserror::Error)]
pub enum RuleSourceError {
    #[error("failed to read rule table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("rule table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed rule table: {0}")]
    Malformed(#[from] MalformedRuleTable),
    #[error("bundled rule table is invalid: {0}")]
    Bundled(String),
}

/// Validated, immutable mapping from every question to its scoring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<QuestionRule>,
}

impl RuleTable {
    /// Validates raw declarative data. Accepts `{"questions": {...}}` or the bare question map.
    pub fn from_value(value: &Value) -> Result<Self, MalformedRuleTable> {
        let questions = match value {
            Value::Object(root) => match root.get("questions") {
                Some(Value::Object(questions)) => questions,
                Some(_) => return Err(MalformedRuleTable::MalformedQuestions),
                None => root,
            },
            _ => return Err(MalformedRuleTable::MalformedQuestions),
        };

        // Exactly one entry per question, in ascending order.
        let entries = index_questions(questions)?;

        let mut rules = Vec::with_capacity(usize::from(TOTAL_QUESTIONS));
        for (question, entry) in entries {
            rules.push(parse_rule(question, entry)?);
        }

        Ok(Self { rules })
    }

    /// Parses JSON text. Objects repeating a key are rejected instead of keeping the last entry.
    pub fn from_json_str(raw: &str) -> Result<Self, RuleSourceError> {
        let UniqueKeys(value) = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleSourceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RuleSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&raw)?;
        info!(path = %path.display(), questions = table.len(), "rule table loaded");
        Ok(table)
    }

    /// Builds a table from typed rules, enforcing the same coverage and contribution checks.
    pub fn from_rules<I>(rules: I) -> Result<Self, MalformedRuleTable>
    where
        I: IntoIterator<Item = (QuestionId, QuestionRule)>,
    {
        let mut indexed: BTreeMap<QuestionId, QuestionRule> = BTreeMap::new();
        for (question, rule) in rules {
            if indexed.insert(question, rule).is_some() {
                return Err(MalformedRuleTable::DuplicateRule {
                    question: question.get(),
                });
            }
        }

        let mut ordered = Vec::with_capacity(indexed.len());
        for question in QuestionId::all() {
            let rule = indexed
                .remove(&question)
                .ok_or(MalformedRuleTable::MissingRule {
                    question: question.get(),
                })?;
            for choice in AnswerChoice::ALL {
                let points = rule.points_for(choice);
                if let Some(category) = points.first_out_of_range() {
                    return Err(MalformedRuleTable::InvalidContribution {
                        question: question.get(),
                        choice,
                        category,
                        value: points.get(category).to_string(),
                    });
                }
            }
            ordered.push(rule);
        }

        Ok(Self { rules: ordered })
    }

    /// The rule table shipped with the crate, validated once per process.
    pub fn bundled() -> Result<&'static RuleTable, &'static RuleSourceError> {
        static BUNDLED: OnceLock<Result<RuleTable, RuleSourceError>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                let table = RuleTable::from_json_str(BUNDLED_RULES)?;
                info!(questions = table.len(), "bundled rule table loaded");
                Ok(table)
            })
            .as_ref()
    }

    pub fn rule(&self, question: QuestionId) -> Option<&QuestionRule> {
        self.rules.get(usize::from(question.get()) - 1)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn index_questions(
    questions: &Map<String, Value>,
) -> Result<BTreeMap<QuestionId, &Value>, MalformedRuleTable> {
    let mut entries = BTreeMap::new();
    let mut unexpected = Vec::new();
    let mut duplicate = None;

    for (key, entry) in questions {
        match key.trim().parse::<u8>().ok().and_then(QuestionId::new) {
            Some(question) => {
                if entries.insert(question, entry).is_some() && duplicate.is_none() {
                    duplicate = Some(question.get());
                }
            }
            None => unexpected.push(key.clone()),
        }
    }

    if let Some(missing) = QuestionId::all().find(|question| !entries.contains_key(question)) {
        return Err(MalformedRuleTable::MissingRule {
            question: missing.get(),
        });
    }
    if let Some(key) = unexpected.into_iter().next() {
        return Err(MalformedRuleTable::UnexpectedQuestion { key });
    }
    if let Some(question) = duplicate {
        return Err(MalformedRuleTable::DuplicateRule { question });
    }

    Ok(entries)
}

fn parse_rule(question: QuestionId, entry: &Value) -> Result<QuestionRule, MalformedRuleTable> {
    let Value::Object(entry) = entry else {
        return Err(MalformedRuleTable::MalformedRule {
            question: question.get(),
        });
    };

    Ok(QuestionRule {
        answer1: parse_point_map(question, AnswerChoice::First, entry)?,
        answer2: parse_point_map(question, AnswerChoice::Second, entry)?,
    })
}

fn parse_point_map(
    question: QuestionId,
    choice: AnswerChoice,
    entry: &Map<String, Value>,
) -> Result<PointMap, MalformedRuleTable> {
    let Some(Value::Object(raw)) = entry.get(choice.rule_key()) else {
        return Err(MalformedRuleTable::MalformedPointMap {
            question: question.get(),
            choice,
        });
    };

    let mut points = PointMap::new();
    for (key, value) in raw {
        let category =
            Category::from_key(key).ok_or_else(|| MalformedRuleTable::UnknownCategoryKey {
                question: question.get(),
                choice,
                key: key.clone(),
            })?;

        let contribution = value
            .as_f64()
            .filter(|points| contribution_in_range(*points))
            .ok_or_else(|| MalformedRuleTable::InvalidContribution {
                question: question.get(),
                choice,
                category,
                value: value.to_string(),
            })?;

        points.set(category, contribution);
    }

    Ok(points)
}

/// JSON value whose objects never repeat a key.
struct UniqueKeys(Value);

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor).map(UniqueKeys)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(UniqueKeys(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key \"{key}\"")));
            }
            let UniqueKeys(value) = map.next_value()?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}
