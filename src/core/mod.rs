// Core algorithm exports
pub mod assembler;
pub mod distance;
pub mod filters;
pub mod language;
pub mod lexicon;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod ranker;
pub mod scoring;

pub use assembler::ResultAssembler;
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box, is_within_radius};
pub use filters::{count_served_dishes, satisfies_constraints, FilterBuilder};
pub use language::{LanguageDecision, LanguageResolver, LanguageSource};
pub use lexicon::{Lexicon, LexiconBuilder, LexiconError};
pub use matcher::{LexiconMatch, LexiconMatcher, MatchOutcome, TokenSpan};
pub use normalize::{normalize, NormalizedText};
pub use pipeline::{EmptyFilterPolicy, Extraction, InputError, Pipeline, PipelineError, PipelineOptions};
pub use ranker::{Ranker, Ranking};
pub use scoring::calculate_match_score;
