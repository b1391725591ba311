use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Languages understood by the lexicon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::De, Language::En];

    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn other(&self) -> Language {
        match self {
            Language::De => Language::En,
            Language::En => Language::De,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses `de`, `en` and locale tags such as `de-AT` or `en_US`, case-insensitively
impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language: {0:?}")]
pub struct UnknownLanguage(pub String);

/// Price tier of a restaurant
///
/// The euro aliases keep the original seed data (`€` .. `€€€€`) loadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRange {
    #[serde(alias = "€")]
    Low,
    #[serde(alias = "€€")]
    Mid,
    #[serde(alias = "€€€", alias = "€€€€")]
    High,
}

impl PriceRange {
    pub const ALL: [PriceRange; 3] = [PriceRange::Low, PriceRange::Mid, PriceRange::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Low => "low",
            PriceRange::Mid => "mid",
            PriceRange::High => "high",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = InvalidPriceTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" | "€" => Ok(PriceRange::Low),
            "mid" | "€€" => Ok(PriceRange::Mid),
            "high" | "€€€" | "€€€€" => Ok(PriceRange::High),
            other => Err(InvalidPriceTag(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid price tag: {0:?}")]
pub struct InvalidPriceTag(pub String);

/// Inclusive range of price tiers; a single tier is a band with `min == max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: PriceRange,
    pub max: PriceRange,
}

impl PriceBand {
    pub fn exact(tier: PriceRange) -> Self {
        Self { min: tier, max: tier }
    }

    pub fn contains(&self, tier: PriceRange) -> bool {
        tier >= self.min && tier <= self.max
    }

    pub fn tiers(&self) -> Vec<PriceRange> {
        PriceRange::ALL
            .into_iter()
            .filter(|tier| self.contains(*tier))
            .collect()
    }
}

/// Parses `low`, `mid`, `high` or a range written as `low..mid`
impl FromStr for PriceBand {
    type Err = InvalidPriceTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("..") {
            Some((lo, hi)) => {
                let min: PriceRange = lo.parse()?;
                let max: PriceRange = hi.parse()?;
                if min > max {
                    return Err(InvalidPriceTag(s.to_string()));
                }
                Ok(Self { min, max })
            }
            None => s.parse().map(Self::exact),
        }
    }
}

/// Filter dimensions a message can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Cuisine,
    Price,
    Feature,
    Dish,
    Location,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Cuisine,
        Dimension::Price,
        Dimension::Feature,
        Dimension::Dish,
        Dimension::Location,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Cuisine => "cuisine",
            Dimension::Price => "price",
            Dimension::Feature => "feature",
            Dimension::Dish => "dish",
            Dimension::Location => "location",
        };
        f.write_str(name)
    }
}

/// One dish or drink on a restaurant's menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    /// Price as printed on the menu, e.g. `ab 9,50 €`
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Restaurant record as delivered by the repository
///
/// Owned by the data store; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cuisine: BTreeSet<String>,
    pub price_range: PriceRange,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub last_verified: Option<chrono::DateTime<chrono::Utc>>,
}

impl Restaurant {
    /// Coordinates, when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Place constraint resolved from a known place name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConstraint {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Structured search intent for one request
///
/// Built once by the filter builder and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFilter {
    language: Language,
    cuisine_tags: BTreeSet<String>,
    price_range: Option<PriceBand>,
    feature_tags: BTreeSet<String>,
    dish_keywords: BTreeSet<String>,
    location: Option<LocationConstraint>,
    free_text_residual: Vec<String>,
    max_results: usize,
}

impl QueryFilter {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        language: Language,
        cuisine_tags: BTreeSet<String>,
        price_range: Option<PriceBand>,
        feature_tags: BTreeSet<String>,
        dish_keywords: BTreeSet<String>,
        location: Option<LocationConstraint>,
        free_text_residual: Vec<String>,
        max_results: usize,
    ) -> Self {
        Self {
            language,
            cuisine_tags,
            price_range,
            feature_tags,
            dish_keywords,
            location,
            free_text_residual,
            max_results,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn cuisine_tags(&self) -> &BTreeSet<String> {
        &self.cuisine_tags
    }

    pub fn price_range(&self) -> Option<PriceBand> {
        self.price_range
    }

    pub fn feature_tags(&self) -> &BTreeSet<String> {
        &self.feature_tags
    }

    /// Folded dish names searched for in menu item names
    pub fn dish_keywords(&self) -> &BTreeSet<String> {
        &self.dish_keywords
    }

    pub fn location(&self) -> Option<&LocationConstraint> {
        self.location.as_ref()
    }

    pub fn free_text_residual(&self) -> &[String] {
        &self.free_text_residual
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// True when no dimension carries a constraint ("no discernible intent")
    pub fn is_unconstrained(&self) -> bool {
        self.cuisine_tags.is_empty()
            && self.price_range.is_none()
            && self.feature_tags.is_empty()
            && self.dish_keywords.is_empty()
            && self.location.is_none()
    }
}

/// Ranked restaurant with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub restaurant: Restaurant,
    /// Dimension score plus the rating bonus
    pub score: f64,
    pub dimension_score: u32,
    pub satisfied: Vec<Dimension>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Scoring weights
///
/// Dimension weights are integral so that the fractional rating bonus can only
/// ever separate candidates with equal dimension scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub cuisine: u32,
    pub price: u32,
    pub feature: u32,
    pub dish: u32,
    pub location: u32,
    pub rating_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cuisine: 3,
            price: 2,
            feature: 1,
            dish: 1,
            location: 1,
            rating_bonus: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid scoring weights: {0}")]
pub struct InvalidWeights(pub String);

impl ScoringWeights {
    /// Enforces cuisine > price > feature >= 1, dish and location >= 1 and a rating bonus in [0, 1)
    pub fn validate(&self) -> Result<(), InvalidWeights> {
        if self.feature < 1 || self.dish < 1 || self.location < 1 {
            return Err(InvalidWeights(
                "feature, dish and location weights must be at least 1".to_string(),
            ));
        }
        if !(self.cuisine > self.price && self.price > self.feature) {
            return Err(InvalidWeights(format!(
                "expected cuisine > price > feature, got {} / {} / {}",
                self.cuisine, self.price, self.feature
            )));
        }
        if !(0.0..1.0).contains(&self.rating_bonus) {
            return Err(InvalidWeights(format!(
                "rating bonus must lie in [0, 1), got {}",
                self.rating_bonus
            )));
        }
        Ok(())
    }
}
