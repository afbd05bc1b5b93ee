use serde::Serialize;

use crate::scoring::{rank, AnswerSet, Category, QuestionId, Ranking, Score};

/// Default minimum score for the runner-up category to be shown as a secondary trait.
pub const DEFAULT_SECONDARY_THRESHOLD: f64 = 5.0;

/// Coarse strength bucket for a single category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryStrong,
    Strong,
    Noticeable,
    Weak,
}

impl Strength {
    pub fn for_score(value: f64) -> Self {
        if value >= 15.0 {
            Strength::VeryStrong
        } else if value >= 10.0 {
            Strength::Strong
        } else if value >= 5.0 {
            Strength::Noticeable
        } else {
            Strength::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::VeryStrong => "非常に強い",
            Strength::Strong => "強い",
            Strength::Noticeable => "気になりやすい",
            Strength::Weak => "弱め",
        }
    }
}

fn commentary(category: Category) -> &'static str {
    match category {
        Category::A => "安定型の傾向が強めです。人を信頼しやすく、距離感を調整しながら関係を続ける力が比較的高い状態です。",
        Category::B => "不安型の傾向が強めです。相手の反応に敏感になりやすく、見捨てられ不安が高まると気持ちが揺れやすい状態です。",
        Category::C => "回避型の傾向が強めです。親密さに負担を感じやすく、近づきたい気持ちと距離を取りたい気持ちがぶつかりやすい状態です。",
        Category::D => "未解決軸の傾向が強めです。強いストレス時に気持ちや行動が不安定になりやすく、過去体験の影響が出ることがあります。",
    }
}

fn unresolved_advice(score: &Score) -> &'static str {
    let unresolved = score.get(Category::D);
    if unresolved >= 10.0 {
        "D軸が高めです。ストレスが強い時は、睡眠・休息・相談先の確保を優先してください。"
    } else if unresolved >= 5.0 {
        "D軸は中程度です。疲労が強い時に感情が揺れやすい可能性があります。"
    } else {
        "D軸は低めです。日常では比較的安定して対処しやすい状態です。"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitView {
    pub category: Category,
    pub label: &'static str,
    pub score: f64,
    pub commentary: &'static str,
}

impl TraitView {
    fn new(category: Category, score: &Score) -> Self {
        Self {
            category,
            label: category.label(),
            score: score.get(category),
            commentary: commentary(category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub category: Category,
    pub label: &'static str,
    pub score: f64,
    pub strength: Strength,
    pub strength_label: &'static str,
    /// Set on every category that ties the top score.
    pub highlighted: bool,
}

/// Everything a result page needs, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub ranking: Ranking,
    pub primary: TraitView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<TraitView>,
    pub rows: Vec<ScoreRow>,
    pub unresolved_advice: &'static str,
}

impl ResultView {
    pub fn build(score: &Score, secondary_threshold: f64) -> Self {
        let ranking = rank(score);
        let top = score.get(ranking.primary());

        let secondary = Some(ranking.secondary())
            .filter(|category| score.get(*category) >= secondary_threshold)
            .map(|category| TraitView::new(category, score));

        let rows = ranking
            .iter()
            .map(|category| {
                let value = score.get(category);
                let strength = Strength::for_score(value);
                ScoreRow {
                    category,
                    label: category.label(),
                    score: value,
                    strength,
                    strength_label: strength.label(),
                    highlighted: value == top,
                }
            })
            .collect();

        Self {
            primary: TraitView::new(ranking.primary(), score),
            secondary,
            rows,
            unresolved_advice: unresolved_advice(score),
            ranking,
        }
    }
}

/// One line of the admin answer sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerLine {
    pub question: QuestionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<u8>,
    pub display: String,
}

/// Lists every question with the recorded choice, or `未回答` when none was stored.
pub fn answer_lines(answers: &AnswerSet) -> Vec<AnswerLine> {
    QuestionId::all()
        .map(|question| {
            let choice = answers.get(question).map(|choice| choice.value());
            let display = match choice {
                Some(value) => format!("Q{question}：回答{value}"),
                None => format!("Q{question}：未回答"),
            };
            AnswerLine {
                question,
                choice,
                display,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::AnswerChoice;

    #[test]
    fn strength_buckets_use_inclusive_lower_bounds() {
        assert_eq!(Strength::for_score(15.0), Strength::VeryStrong);
        assert_eq!(Strength::for_score(14.5), Strength::Strong);
        assert_eq!(Strength::for_score(10.0), Strength::Strong);
        assert_eq!(Strength::for_score(5.0), Strength::Noticeable);
        assert_eq!(Strength::for_score(4.0), Strength::Weak);
        assert_eq!(Strength::for_score(-2.0).label(), "弱め");
    }

    #[test]
    fn secondary_trait_requires_threshold() {
        let view = ResultView::build(&Score::new(12.0, 4.0, 3.0, 1.0), DEFAULT_SECONDARY_THRESHOLD);
        assert_eq!(view.primary.category, Category::A);
        assert!(view.secondary.is_none());

        let view = ResultView::build(&Score::new(12.0, 5.0, 3.0, 1.0), DEFAULT_SECONDARY_THRESHOLD);
        let secondary = view.secondary.expect("secondary shown");
        assert_eq!(secondary.category, Category::B);
        assert_eq!(secondary.label, "B（不安）");
    }

    #[test]
    fn rows_follow_ranking_and_highlight_ties_with_top() {
        let view = ResultView::build(&Score::new(6.0, 9.0, 9.0, 2.0), DEFAULT_SECONDARY_THRESHOLD);

        let order: Vec<Category> = view.rows.iter().map(|row| row.category).collect();
        assert_eq!(order, vec![Category::B, Category::C, Category::A, Category::D]);
        let highlighted: Vec<bool> = view.rows.iter().map(|row| row.highlighted).collect();
        assert_eq!(highlighted, vec![true, true, false, false]);
        assert_eq!(view.rows[0].strength_label, "気になりやすい");
    }

    #[test]
    fn unresolved_advice_tracks_d_axis() {
        let high = ResultView::build(&Score::new(0.0, 0.0, 0.0, 10.0), DEFAULT_SECONDARY_THRESHOLD);
        assert!(high.unresolved_advice.starts_with("D軸が高め"));

        let moderate = ResultView::build(&Score::new(9.0, 0.0, 0.0, 5.0), DEFAULT_SECONDARY_THRESHOLD);
        assert!(moderate.unresolved_advice.starts_with("D軸は中程度"));

        let low = ResultView::build(&Score::zero(), DEFAULT_SECONDARY_THRESHOLD);
        assert!(low.unresolved_advice.starts_with("D軸は低め"));
    }

    #[test]
    fn answer_lines_mark_unanswered_questions() {
        let mut answers = AnswerSet::new();
        answers.insert(QuestionId::new(1).expect("valid"), AnswerChoice::Second);

        let lines = answer_lines(&answers);
        assert_eq!(lines.len(), 45);
        assert_eq!(lines[0].display, "Q1：回答2");
        assert_eq!(lines[0].choice, Some(2));
        assert_eq!(lines[1].display, "Q2：未回答");
        assert!(lines[1].choice.is_none());
    }
}
