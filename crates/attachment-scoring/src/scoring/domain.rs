use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of questions in the questionnaire.
pub const TOTAL_QUESTIONS: u8 = 45;

/// Question number, guaranteed to lie in `1..=TOTAL_QUESTIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct QuestionId(u8);

impl QuestionId {
    pub fn new(value: u8) -> Option<Self> {
        (1..=TOTAL_QUESTIONS).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every question number in ascending order.
    pub fn all() -> impl Iterator<Item = QuestionId> + Clone {
        (1..=TOTAL_QUESTIONS).map(QuestionId)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for QuestionId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        QuestionId::new(value)
            .ok_or_else(|| format!("question {value} outside 1..={TOTAL_QUESTIONS}"))
    }
}

impl From<QuestionId> for u8 {
    fn from(value: QuestionId) -> Self {
        value.0
    }
}

/// One of the two options offered for every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnswerChoice {
    First,
    Second,
}

impl AnswerChoice {
    pub const ALL: [AnswerChoice; 2] = [AnswerChoice::First, AnswerChoice::Second];

    pub fn value(self) -> u8 {
        match self {
            AnswerChoice::First => 1,
            AnswerChoice::Second => 2,
        }
    }

    /// Name of the matching sub-entry in a rule table question.
    pub fn rule_key(self) -> &'static str {
        match self {
            AnswerChoice::First => "answer1",
            AnswerChoice::Second => "answer2",
        }
    }
}

impl fmt::Display for AnswerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_key())
    }
}

impl TryFrom<u8> for AnswerChoice {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AnswerChoice::First),
            2 => Ok(AnswerChoice::Second),
            other => Err(format!("answer choice must be 1 or 2, got {other}")),
        }
    }
}

impl From<AnswerChoice> for u8 {
    fn from(value: AnswerChoice) -> Self {
        value.value()
    }
}

/// Closed set of score categories. Declaration order is the canonical tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "scA", alias = "A")]
    A,
    #[serde(rename = "scB", alias = "B")]
    B,
    #[serde(rename = "scC", alias = "C")]
    C,
    #[serde(rename = "scD", alias = "D")]
    D,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::A, Category::B, Category::C, Category::D];

    pub fn index(self) -> usize {
        match self {
            Category::A => 0,
            Category::B => 1,
            Category::C => 2,
            Category::D => 3,
        }
    }

    /// Storage key used in rule tables and persisted scores.
    pub fn key(self) -> &'static str {
        match self {
            Category::A => "scA",
            Category::B => "scB",
            Category::C => "scC",
            Category::D => "scD",
        }
    }

    /// Accepts the storage key or the bare letter.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw {
            "scA" | "A" => Some(Category::A),
            "scB" | "B" => Some(Category::B),
            "scC" | "C" => Some(Category::C),
            "scD" | "D" => Some(Category::D),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::A => "A（安定）",
            Category::B => "B（不安）",
            Category::C => "C（回避）",
            Category::D => "D（未解決）",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Points an answer adds to each category. Categories never set contribute zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointMap {
    points: [f64; 4],
}

impl PointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, points: f64) -> Self {
        self.points[category.index()] = points;
        self
    }

    pub fn get(&self, category: Category) -> f64 {
        self.points[category.index()]
    }

    pub(crate) fn set(&mut self, category: Category, points: f64) {
        self.points[category.index()] = points;
    }

    pub(crate) fn first_out_of_range(&self) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| !contribution_in_range(self.get(*category)))
    }
}

/// Largest magnitude a single contribution may have. One extra share of headroom keeps the
/// sum over every question finite after rounding.
pub const MAX_CONTRIBUTION: f64 = f64::MAX / (TOTAL_QUESTIONS as f64 + 1.0);

pub(crate) fn contribution_in_range(points: f64) -> bool {
    points.is_finite() && points.abs() <= MAX_CONTRIBUTION
}

/// Contributions for both answers of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuestionRule {
    pub answer1: PointMap,
    pub answer2: PointMap,
}

impl QuestionRule {
    pub fn new(answer1: PointMap, answer2: PointMap) -> Self {
        Self { answer1, answer2 }
    }

    pub fn points_for(&self, choice: AnswerChoice) -> &PointMap {
        match choice {
            AnswerChoice::First => &self.answer1,
            AnswerChoice::Second => &self.answer2,
        }
    }
}

/// Accumulated totals for all four categories.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Score {
    #[serde(rename = "scA")]
    a: f64,
    #[serde(rename = "scB")]
    b: f64,
    #[serde(rename = "scC")]
    c: f64,
    #[serde(rename = "scD")]
    d: f64,
}

impl Score {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::A => self.a,
            Category::B => self.b,
            Category::C => self.c,
            Category::D => self.d,
        }
    }

    pub(crate) fn add(&mut self, points: &PointMap) {
        self.a += points.get(Category::A);
        self.b += points.get(Category::B);
        self.c += points.get(Category::C);
        self.d += points.get(Category::D);
    }
}

/// Answers keyed by question. May be partial until checked with [`AnswerSet::is_complete`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, AnswerChoice>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: QuestionId, choice: AnswerChoice) {
        self.answers.insert(question, choice);
    }

    pub fn get(&self, question: QuestionId) -> Option<AnswerChoice> {
        self.answers.get(&question).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, AnswerChoice)> + '_ {
        self.answers.iter().map(|(question, choice)| (*question, *choice))
    }

    pub fn first_missing(&self) -> Option<QuestionId> {
        QuestionId::all().find(|question| !self.answers.contains_key(question))
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }
}

impl FromIterator<(QuestionId, AnswerChoice)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerChoice)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
