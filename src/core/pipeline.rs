use crate::core::{
    assembler::ResultAssembler,
    filters::FilterBuilder,
    language::{LanguageDecision, LanguageResolver},
    lexicon::Lexicon,
    matcher::{LexiconMatch, LexiconMatcher},
    normalize::{normalize, NormalizedText},
    ranker::Ranker,
};
use crate::models::{Language, QueryFilter, ResultBundle, ScoringWeights};
use crate::services::{GatewayError, RepositoryGateway};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Rejected before any text processing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("message is empty")]
    Empty,

    #[error("message is {length} characters long, the maximum is {max}")]
    TooLong { length: usize, max: usize },
}

/// Failures of a pipeline run
///
/// A request that simply finds nothing is not an error; see [`crate::models::Outcome`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("repository failure: {0}")]
    Gateway(#[from] GatewayError),
}

/// What to do when a message maps onto no filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilterPolicy {
    /// Report "no discernible intent" without touching the repository
    #[default]
    NoIntent,
    /// Rank the whole dataset by rating
    Browse,
}

/// Tunables for one pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub max_results: usize,
    pub max_message_chars: usize,
    pub empty_filter_policy: EmptyFilterPolicy,
    pub location_radius_m: f64,
    /// Language used when markers tie
    pub default_language: Language,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_message_chars: 1000,
            empty_filter_policy: EmptyFilterPolicy::NoIntent,
            location_radius_m: 800.0,
            default_language: Language::En,
        }
    }
}

/// Intent extracted from a message, before the repository is consulted
#[derive(Debug, Clone)]
pub struct Extraction {
    pub normalized: NormalizedText,
    pub language: LanguageDecision,
    pub matches: Vec<LexiconMatch>,
    pub filter: QueryFilter,
}

/// Intent extraction and ranking orchestrator
///
/// # Pipeline Stages
/// 1. Input validation
/// 2. Normalization
/// 3. Language resolution
/// 4. Lexicon matching
/// 5. Filter building
/// 6. Candidate lookup through the repository gateway
/// 7. Ranking and truncation
/// 8. Result assembly
///
/// Holds no per-request state; clones share the lexicon and gateway.
#[derive(Clone)]
pub struct Pipeline {
    lexicon: Arc<Lexicon>,
    gateway: Arc<dyn RepositoryGateway>,
    ranker: Ranker,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        lexicon: Arc<Lexicon>,
        gateway: Arc<dyn RepositoryGateway>,
        weights: ScoringWeights,
        options: PipelineOptions,
    ) -> Self {
        Self {
            lexicon,
            gateway,
            ranker: Ranker::new(weights),
            options,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Reject empty or oversized messages
    pub fn validate_message(&self, message: &str) -> Result<(), InputError> {
        if message.trim().is_empty() {
            return Err(InputError::Empty);
        }

        let length = message.chars().count();
        if length > self.options.max_message_chars {
            return Err(InputError::TooLong {
                length,
                max: self.options.max_message_chars,
            });
        }

        Ok(())
    }

    /// Run stages 1-5: turn a message into a filter
    pub fn extract(&self, message: &str, hint: Option<Language>) -> Result<Extraction, InputError> {
        self.validate_message(message)?;

        let normalized = normalize(message);
        let language = LanguageResolver::with_fallback(&self.lexicon, self.options.default_language)
            .resolve(&normalized, hint);

        let outcome = LexiconMatcher::new(&self.lexicon).find_matches(&normalized, language.language);

        let filter = FilterBuilder::new(
            &self.lexicon,
            self.options.max_results,
            self.options.location_radius_m,
        )
        .build(&outcome.matches, language.language, outcome.residual);

        tracing::debug!(
            "Extracted filter: language={} ({:?}, de={}, en={}), cuisine={:?}, price={:?}, features={:?}, dishes={:?}, location={:?}",
            language.language,
            language.source,
            language.german_markers,
            language.english_markers,
            filter.cuisine_tags(),
            filter.price_range(),
            filter.feature_tags(),
            filter.dish_keywords(),
            filter.location().map(|l| l.place.as_str()),
        );

        Ok(Extraction {
            normalized,
            language,
            matches: outcome.matches,
            filter,
        })
    }

    /// Extract intent from a message and rank matching restaurants
    ///
    /// The gateway is called at most once and its errors are returned as-is.
    pub async fn extract_and_rank(
        &self,
        message: &str,
        hint: Option<Language>,
    ) -> Result<ResultBundle, PipelineError> {
        let extraction = self.extract(message, hint)?;
        let filter = extraction.filter;

        if filter.is_unconstrained() && self.options.empty_filter_policy == EmptyFilterPolicy::NoIntent {
            tracing::info!(
                "No discernible intent in message ({} residual tokens)",
                filter.free_text_residual().len()
            );
            return Ok(ResultAssembler::no_discernible_intent(filter, message));
        }

        let candidates = self.gateway.find_candidates(&filter).await.map_err(|e| {
            tracing::error!("Repository lookup failed: {}", e);
            e
        })?;

        let ranking = self.ranker.rank(candidates, &filter);

        tracing::info!(
            "Returning {} results (from {} candidates, language {})",
            ranking.results.len(),
            ranking.total_candidates,
            filter.language()
        );

        Ok(ResultAssembler::assemble(ranking, filter, message))
    }
}
