use crate::models::{QueryFilter, Restaurant};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a repository gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed repository data: {0}")]
    Malformed(String),

    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only access to restaurant records
///
/// Implementations return every record satisfying the filter's hard
/// constraints, in any order. Ranking and truncation happen in the caller.
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    async fn find_candidates(&self, filter: &QueryFilter) -> Result<Vec<Restaurant>, GatewayError>;
}
