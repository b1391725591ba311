//! Graz Eats - intent extraction and ranking for a restaurant assistant
//!
//! Turns a free-text German or English message ("günstige vegane Pizza am
//! Lendplatz") into a structured filter, fetches matching restaurants through a
//! repository gateway and returns a deterministic, ranked result bundle.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Lexicon, Pipeline, PipelineError, PipelineOptions};
pub use models::{Language, Outcome, QueryFilter, Restaurant, ResultBundle, ScoringWeights};
pub use services::{DatasetGateway, RepositoryGateway};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let lexicon = Lexicon::builtin().unwrap();
        assert!(lexicon.version().is_some());
        assert_eq!(PipelineOptions::default().max_results, 5);
    }
}
