use std::cmp::Ordering;

use serde::Serialize;

use super::domain::{Category, Score};

/// Categories ordered by descending score. Equal scores keep [`Category::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ranking([Category; 4]);

impl Ranking {
    pub fn primary(&self) -> Category {
        self.0[0]
    }

    pub fn secondary(&self) -> Category {
        self.0[1]
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }
}

pub fn rank(score: &Score) -> Ranking {
    let mut ordered = Category::ALL;
    ordered.sort_by(|left, right| {
        score
            .get(*right)
            .partial_cmp(&score.get(*left))
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.index().cmp(&right.index()))
    });
    Ranking(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_descending_score() {
        let ranking = rank(&Score::new(2.0, 9.0, 4.0, 7.0));
        assert_eq!(
            ranking.as_slice(),
            &[Category::B, Category::D, Category::C, Category::A]
        );
        assert_eq!(ranking.primary(), Category::B);
        assert_eq!(ranking.secondary(), Category::D);
    }

    #[test]
    fn ties_follow_canonical_order() {
        let ranking = rank(&Score::new(3.0, 5.0, 5.0, 3.0));
        assert_eq!(
            ranking.as_slice(),
            &[Category::B, Category::C, Category::A, Category::D]
        );
    }

    #[test]
    fn all_equal_scores_rank_canonically_on_every_call() {
        let score = Score::new(4.0, 4.0, 4.0, 4.0);
        for _ in 0..10 {
            assert_eq!(rank(&score).as_slice(), &Category::ALL);
        }
    }

    #[test]
    fn negative_totals_rank_below_zero() {
        let ranking = rank(&Score::new(-1.0, 0.0, -3.0, 0.0));
        assert_eq!(
            ranking.as_slice(),
            &[Category::B, Category::D, Category::A, Category::C]
        );
    }

    #[test]
    fn serializes_as_storage_keys() {
        let ranking = rank(&Score::new(0.0, 0.0, 1.0, 0.0));
        let value = serde_json::to_value(ranking).expect("ranking serializes");
        assert_eq!(value, serde_json::json!(["scC", "scA", "scB", "scD"]));
    }
}
