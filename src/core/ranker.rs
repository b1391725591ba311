use crate::core::scoring::calculate_match_score;
use crate::models::{MatchResult, QueryFilter, Restaurant, ScoringWeights};
use std::cmp::Ordering;

/// Ordered, truncated candidates
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub results: Vec<MatchResult>,
    /// Size of the candidate pool before truncation
    pub total_candidates: usize,
    pub has_any_match: bool,
}

/// Scores candidates and orders them deterministically
///
/// # Ordering
/// 1. Score (descending)
/// 2. Rating (descending, unknown ratings last)
/// 3. Review count (descending, unknown counts last)
/// 4. Id (ascending)
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank candidates and keep at most `filter.max_results()` of them
    ///
    /// `has_any_match` reflects the untruncated pool.
    pub fn rank(&self, candidates: Vec<Restaurant>, filter: &QueryFilter) -> Ranking {
        let total_candidates = candidates.len();

        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .map(|restaurant| {
                let score = calculate_match_score(&restaurant, filter, &self.weights);
                MatchResult {
                    score: score.total(),
                    dimension_score: score.dimension_score,
                    satisfied: score.satisfied,
                    restaurant,
                }
            })
            .collect();

        results.sort_by(compare_results);
        results.truncate(filter.max_results());

        Ranking {
            results,
            total_candidates,
            has_any_match: total_candidates > 0,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Total order over ranked results
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| compare_ratings(a.restaurant.rating, b.restaurant.rating))
        .then_with(|| b.restaurant.review_count.cmp(&a.restaurant.review_count))
        .then_with(|| a.restaurant.id.cmp(&b.restaurant.id))
}

/// Higher ratings first, missing ratings last
fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
