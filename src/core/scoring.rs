use crate::core::filters::{count_served_dishes, matches_location};
use crate::models::{Dimension, QueryFilter, Restaurant, ScoringWeights};

/// Highest rating the bonus is normalized against
const MAX_RATING: f64 = 5.0;

/// Relevance of one candidate for a filter
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// Weighted count of satisfied constraints
    pub dimension_score: u32,
    /// Fractional rating bonus, always below 1
    pub rating_bonus: f64,
    pub satisfied: Vec<Dimension>,
}

impl CandidateScore {
    pub fn total(&self) -> f64 {
        self.dimension_score as f64 + self.rating_bonus
    }
}

/// Calculate the relevance score for a restaurant
///
/// Scoring formula:
/// score = (
///     matched cuisine tags * cuisine weight +   # 3 by default
///     price band hit       * price weight +     # 2
///     matched feature tags * feature weight +   # 1
///     dishes on the menu   * dish weight +      # 1
///     location hit         * location weight    # 1
/// ) + rating / 5 * rating_bonus                 # < 1, tie-breaking only
pub fn calculate_match_score(
    restaurant: &Restaurant,
    filter: &QueryFilter,
    weights: &ScoringWeights,
) -> CandidateScore {
    let mut dimension_score = 0;
    let mut satisfied = Vec::new();

    let cuisine_hits = filter
        .cuisine_tags()
        .intersection(&restaurant.cuisine)
        .count() as u32;
    if cuisine_hits > 0 {
        dimension_score += cuisine_hits * weights.cuisine;
        satisfied.push(Dimension::Cuisine);
    }

    if let Some(band) = filter.price_range() {
        if band.contains(restaurant.price_range) {
            dimension_score += weights.price;
            satisfied.push(Dimension::Price);
        }
    }

    let feature_hits = filter
        .feature_tags()
        .intersection(&restaurant.features)
        .count() as u32;
    if feature_hits > 0 {
        dimension_score += feature_hits * weights.feature;
        satisfied.push(Dimension::Feature);
    }

    let dish_hits = count_served_dishes(restaurant, filter.dish_keywords()) as u32;
    if dish_hits > 0 {
        dimension_score += dish_hits * weights.dish;
        satisfied.push(Dimension::Dish);
    }

    if let Some(location) = filter.location() {
        if matches_location(restaurant, location) {
            dimension_score += weights.location;
            satisfied.push(Dimension::Location);
        }
    }

    CandidateScore {
        dimension_score,
        rating_bonus: calculate_rating_bonus(restaurant.rating, weights.rating_bonus),
        satisfied,
    }
}

/// Rating bonus in [0, max_bonus]; unknown or non-finite ratings earn nothing
#[inline]
fn calculate_rating_bonus(rating: Option<f64>, max_bonus: f64) -> f64 {
    match rating {
        Some(r) if r.is_finite() => (r.clamp(0.0, MAX_RATING) / MAX_RATING) * max_bonus,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::FilterBuilder;
    use crate::core::lexicon::Lexicon;
    use crate::core::matcher::{LexiconMatch, TokenSpan};
    use crate::models::{Language, MenuItem, PriceRange};

    fn create_restaurant(cuisine: &[&str], price: PriceRange, features: &[&str], rating: Option<f64>) -> Restaurant {
        Restaurant {
            id: "test".to_string(),
            name: "Test".to_string(),
            cuisine: cuisine.iter().map(|s| s.to_string()).collect(),
            price_range: price,
            features: features.iter().map(|s| s.to_string()).collect(),
            rating,
            review_count: Some(10),
            address: "Hauptplatz 1".to_string(),
            phone: None,
            website: None,
            opening_hours: None,
            summary: None,
            latitude: None,
            longitude: None,
            menu_items: vec![],
            menu_url: None,
            data_sources: vec![],
            last_verified: None,
        }
    }

    fn create_filter(hits: &[(Dimension, &str)]) -> QueryFilter {
        let lexicon = Lexicon::builder().build().unwrap();
        let matches: Vec<LexiconMatch> = hits
            .iter()
            .enumerate()
            .map(|(i, (dimension, tag))| LexiconMatch {
                dimension: *dimension,
                tag: tag.to_string(),
                span: TokenSpan { start: i, end: i + 1 },
                matched: tag.to_string(),
            })
            .collect();
        FilterBuilder::new(&lexicon, 5, 800.0).build(&matches, Language::En, vec![])
    }

    #[test]
    fn test_weighted_dimensions() {
        let filter = create_filter(&[
            (Dimension::Cuisine, "italian"),
            (Dimension::Price, "low"),
            (Dimension::Feature, "vegan_options"),
            (Dimension::Feature, "wifi"),
        ]);
        let restaurant = create_restaurant(&["italian"], PriceRange::Low, &["vegan_options", "wifi"], None);

        let score = calculate_match_score(&restaurant, &filter, &ScoringWeights::default());

        assert_eq!(score.dimension_score, 3 + 2 + 1 + 1);
        assert_eq!(score.rating_bonus, 0.0);
        assert_eq!(
            score.satisfied,
            vec![Dimension::Cuisine, Dimension::Price, Dimension::Feature]
        );
    }

    #[test]
    fn test_each_served_dish_counts() {
        let filter = create_filter(&[(Dimension::Dish, "tafelspitz"), (Dimension::Dish, "strudel")]);
        let mut restaurant = create_restaurant(&["austrian"], PriceRange::Mid, &[], None);
        restaurant.menu_items = ["Tafelspitz", "Apfelstrudel", "Gulasch"]
            .iter()
            .map(|name| MenuItem {
                name: name.to_string(),
                price: None,
                price_text: None,
                category: None,
            })
            .collect();

        let score = calculate_match_score(&restaurant, &filter, &ScoringWeights::default());
        assert_eq!(score.dimension_score, 2);
        assert_eq!(score.satisfied, vec![Dimension::Dish]);
    }

    #[test]
    fn test_cuisine_outweighs_feature() {
        let filter = create_filter(&[(Dimension::Cuisine, "italian"), (Dimension::Feature, "wifi")]);
        let weights = ScoringWeights::default();

        let cuisine_only = create_restaurant(&["italian"], PriceRange::Mid, &[], Some(0.0));
        let feature_only = create_restaurant(&[], PriceRange::Mid, &["wifi"], Some(5.0));

        let a = calculate_match_score(&cuisine_only, &filter, &weights);
        let b = calculate_match_score(&feature_only, &filter, &weights);
        assert!(a.total() > b.total());
    }

    #[test]
    fn test_rating_bonus_never_crosses_a_dimension_step() {
        let weights = ScoringWeights::default();
        assert!(calculate_rating_bonus(Some(5.0), weights.rating_bonus) < 1.0);
        assert!(calculate_rating_bonus(Some(50.0), weights.rating_bonus) < 1.0);
        assert_eq!(calculate_rating_bonus(Some(-1.0), weights.rating_bonus), 0.0);
        assert_eq!(calculate_rating_bonus(Some(f64::NAN), weights.rating_bonus), 0.0);
        assert_eq!(calculate_rating_bonus(None, weights.rating_bonus), 0.0);
    }

    #[test]
    fn test_higher_rating_scores_higher() {
        let filter = create_filter(&[(Dimension::Cuisine, "italian")]);
        let weights = ScoringWeights::default();

        let good = create_restaurant(&["italian"], PriceRange::Mid, &[], Some(4.8));
        let okay = create_restaurant(&["italian"], PriceRange::Mid, &[], Some(3.9));

        let good = calculate_match_score(&good, &filter, &weights);
        let okay = calculate_match_score(&okay, &filter, &weights);
        assert_eq!(good.dimension_score, okay.dimension_score);
        assert!(good.total() > okay.total());
    }

    #[test]
    fn test_unconstrained_filter_scores_rating_only() {
        let filter = create_filter(&[]);
        let restaurant = create_restaurant(&["italian"], PriceRange::Mid, &["wifi"], Some(4.0));
        let score = calculate_match_score(&restaurant, &filter, &ScoringWeights::default());
        assert_eq!(score.dimension_score, 0);
        assert!(score.satisfied.is_empty());
        assert!((score.total() - 0.4).abs() < 1e-9);
    }
}
