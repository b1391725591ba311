use serde::{Deserialize, Serialize};
use crate::models::domain::{Language, MatchResult, QueryFilter};

/// How a successfully processed request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one restaurant satisfied the filter
    Matched,
    /// The filter was constrained but no restaurant satisfied it
    NoMatch,
    /// Nothing in the message mapped onto a filter dimension
    NoDiscernibleIntent,
}

/// Structured result handed to the response generator
///
/// `results` only ever contains records the repository returned for `filter`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultBundle {
    pub outcome: Outcome,
    pub has_any_match: bool,
    pub results: Vec<MatchResult>,
    pub total_candidates: usize,
    pub language: Language,
    pub filter: QueryFilter,
    pub free_text_residual: Vec<String>,
    pub original_message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub lexicon_version: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
