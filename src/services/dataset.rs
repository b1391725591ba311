use crate::core::filters::satisfies_constraints;
use crate::models::{QueryFilter, Restaurant};
use crate::services::gateway::{GatewayError, RepositoryGateway};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Seed file layout: either `{ "restaurants": [...] }` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Wrapped { restaurants: Vec<Restaurant> },
    Bare(Vec<Restaurant>),
}

/// In-memory gateway over the curated offline dataset
///
/// Records are loaded once and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatasetGateway {
    restaurants: Vec<Restaurant>,
}

impl DatasetGateway {
    pub fn new(restaurants: Vec<Restaurant>) -> Result<Self, GatewayError> {
        let mut seen = BTreeSet::new();
        for restaurant in &restaurants {
            if !seen.insert(restaurant.id.as_str()) {
                return Err(GatewayError::Malformed(format!(
                    "duplicate restaurant id {:?}",
                    restaurant.id
                )));
            }
        }
        Ok(Self { restaurants })
    }

    /// Load a dataset from a JSON seed file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let gateway = Self::from_json_str(&raw)?;

        tracing::info!(
            "Loaded {} restaurants from {}",
            gateway.len(),
            path.display()
        );

        Ok(gateway)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, GatewayError> {
        let file: DatasetFile = serde_json::from_str(raw)?;
        let restaurants = match file {
            DatasetFile::Wrapped { restaurants } => restaurants,
            DatasetFile::Bare(restaurants) => restaurants,
        };
        Self::new(restaurants)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

#[async_trait]
impl RepositoryGateway for DatasetGateway {
    async fn find_candidates(&self, filter: &QueryFilter) -> Result<Vec<Restaurant>, GatewayError> {
        let candidates: Vec<Restaurant> = self
            .restaurants
            .iter()
            .filter(|restaurant| satisfies_constraints(restaurant, filter))
            .cloned()
            .collect();

        tracing::debug!(
            "Dataset returned {} of {} restaurants",
            candidates.len(),
            self.restaurants.len()
        );

        Ok(candidates)
    }
}
