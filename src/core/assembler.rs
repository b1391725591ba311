use crate::core::ranker::Ranking;
use crate::models::{Outcome, QueryFilter, ResultBundle};

/// Packages pipeline results for the response generator
///
/// Every bundle carries an explicit [`Outcome`]; pipeline failures never
/// reach this stage, so an empty result list always means "nothing found"
/// or "nothing asked for", never "something broke".
pub struct ResultAssembler;

impl ResultAssembler {
    /// Bundle for a request whose filter was sent to the repository
    pub fn assemble(ranking: Ranking, filter: QueryFilter, original_message: &str) -> ResultBundle {
        debug_assert_eq!(ranking.has_any_match, !ranking.results.is_empty());

        let outcome = if ranking.has_any_match {
            Outcome::Matched
        } else {
            Outcome::NoMatch
        };

        ResultBundle {
            outcome,
            has_any_match: ranking.has_any_match,
            results: ranking.results,
            total_candidates: ranking.total_candidates,
            language: filter.language(),
            free_text_residual: filter.free_text_residual().to_vec(),
            filter,
            original_message: original_message.to_string(),
        }
    }

    /// Bundle for a message that carried no usable search signal
    pub fn no_discernible_intent(filter: QueryFilter, original_message: &str) -> ResultBundle {
        ResultBundle {
            outcome: Outcome::NoDiscernibleIntent,
            has_any_match: false,
            results: Vec::new(),
            total_candidates: 0,
            language: filter.language(),
            free_text_residual: filter.free_text_residual().to_vec(),
            filter,
            original_message: original_message.to_string(),
        }
    }
}
