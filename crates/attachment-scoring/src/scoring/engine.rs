use std::sync::Arc;

use serde_json::{Map, Value};

use super::domain::{AnswerSet, QuestionId, Score};
use super::normalizer::normalize_answers;
use super::ranking::{rank, Ranking};
use super::rules::RuleTable;

/// Scoring failures. Either every question is answered and scored, or nothing is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("question {question} has not been answered")]
    IncompleteAnswers { question: QuestionId },
    #[error("no scoring rule for question {question}")]
    MissingRule { question: QuestionId },
}

/// Normalizes a raw submission and scores it.
pub fn score_answers(raw: &Map<String, Value>, rules: &RuleTable) -> Result<Score, ScoringError> {
    score_answer_set(&normalize_answers(raw), rules)
}

/// Sums each category's contributions over every question, in ascending question order.
pub fn score_answer_set(answers: &AnswerSet, rules: &RuleTable) -> Result<Score, ScoringError> {
    let mut score = Score::zero();

    for question in QuestionId::all() {
        let choice = answers
            .get(question)
            .ok_or(ScoringError::IncompleteAnswers { question })?;
        let rule = rules
            .rule(question)
            .ok_or(ScoringError::MissingRule { question })?;

        score.add(rule.points_for(choice));
    }

    Ok(score)
}

/// Stateless evaluator bound to one validated rule table.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rules: Arc<RuleTable>,
}

impl ScoringEngine {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn score(&self, answers: &AnswerSet) -> Result<ScoredAnswers, ScoringError> {
        let score = score_answer_set(answers, &self.rules)?;
        Ok(ScoredAnswers {
            ranking: rank(&score),
            score,
        })
    }
}

/// Score together with its ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredAnswers {
    pub score: Score,
    pub ranking: Ranking,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{AnswerChoice, Category, PointMap, QuestionRule};
    use serde_json::json;

    fn question(value: u8) -> QuestionId {
        QuestionId::new(value).expect("valid question")
    }

    fn single_signal_table() -> RuleTable {
        RuleTable::from_rules(QuestionId::all().map(|id| {
            let rule = if id.get() == 1 {
                QuestionRule::new(
                    PointMap::new().with(Category::A, 1.0),
                    PointMap::new().with(Category::B, 1.0),
                )
            } else {
                QuestionRule::default()
            };
            (id, rule)
        }))
        .expect("valid table")
    }

    fn answered(choice: AnswerChoice) -> AnswerSet {
        QuestionId::all().map(|id| (id, choice)).collect()
    }

    #[test]
    fn single_contribution_reaches_the_selected_category() {
        let table = single_signal_table();
        let mut answers = answered(AnswerChoice::Second);
        answers.insert(question(1), AnswerChoice::First);

        let score = score_answer_set(&answers, &table).expect("complete answers score");
        assert_eq!(score, Score::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(
            rank(&score).as_slice(),
            &[Category::A, Category::B, Category::C, Category::D]
        );
    }

    #[test]
    fn raw_submission_is_normalized_before_scoring() {
        let table = single_signal_table();
        let mut raw: Map<String, Value> = QuestionId::all()
            .map(|id| (id.to_string(), json!(1)))
            .collect();
        raw.insert("1".to_string(), json!(2));
        raw.insert("99".to_string(), json!(1));
        raw.insert("name".to_string(), json!("ignored"));

        let score = score_answers(&raw, &table).expect("complete answers score");
        assert_eq!(score, Score::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn reports_first_unanswered_question() {
        let table = single_signal_table();
        let answers: AnswerSet = QuestionId::all()
            .filter(|id| id.get() != 3 && id.get() != 40)
            .map(|id| (id, AnswerChoice::First))
            .collect();

        let err = score_answer_set(&answers, &table).unwrap_err();
        assert_eq!(err, ScoringError::IncompleteAnswers { question: question(3) });
    }

    #[test]
    fn invalid_values_count_as_unanswered() {
        let table = single_signal_table();
        let mut raw: Map<String, Value> = QuestionId::all()
            .map(|id| (id.to_string(), json!(1)))
            .collect();
        raw.insert("12".to_string(), json!("1"));

        let err = score_answers(&raw, &table).unwrap_err();
        assert_eq!(err, ScoringError::IncompleteAnswers { question: question(12) });
    }

    #[test]
    fn bundled_rules_score_all_first_answers() {
        let table = RuleTable::bundled().expect("bundled rules validate");
        let score = score_answer_set(&answered(AnswerChoice::First), table).expect("scores");

        assert_eq!(score, Score::new(15.0, 13.0, 13.0, 13.0));
    }

    #[test]
    fn engine_returns_score_with_ranking() {
        let engine = ScoringEngine::new(Arc::new(single_signal_table()));
        let mut answers = answered(AnswerChoice::First);
        answers.insert(question(1), AnswerChoice::Second);

        let scored = engine.score(&answers).expect("scores");
        assert_eq!(scored.score.get(Category::B), 1.0);
        assert_eq!(scored.ranking.primary(), Category::B);
        assert_eq!(scored.ranking.secondary(), Category::A);
    }
}
