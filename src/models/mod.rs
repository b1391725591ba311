// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Dimension, InvalidPriceTag, InvalidWeights, Language, LocationConstraint,
    MatchResult, MenuItem, PriceBand, PriceRange, QueryFilter, Restaurant, ScoringWeights,
    UnknownLanguage,
};
pub use requests::SearchRequest;
pub use responses::{ErrorResponse, HealthResponse, Outcome, ResultBundle};
