use crate::core::distance::is_within_radius;
use crate::core::lexicon::Lexicon;
use crate::core::matcher::LexiconMatch;
use crate::core::normalize::tokenize;
use crate::models::{Dimension, Language, LocationConstraint, PriceBand, QueryFilter, Restaurant};
use std::collections::BTreeSet;

/// Assembles lexicon hits into one [`QueryFilter`]
///
/// Cuisine, feature and dish hits are collected into sets. Price and location take a
/// single value: the first hit in message order wins and later conflicting
/// hits are dropped.
#[derive(Debug, Clone, Copy)]
pub struct FilterBuilder<'a> {
    lexicon: &'a Lexicon,
    max_results: usize,
    location_radius_m: f64,
}

impl<'a> FilterBuilder<'a> {
    /// `max_results` is raised to at least 1
    pub fn new(lexicon: &'a Lexicon, max_results: usize, location_radius_m: f64) -> Self {
        Self {
            lexicon,
            max_results: max_results.max(1),
            location_radius_m,
        }
    }

    pub fn build(
        &self,
        matches: &[LexiconMatch],
        language: Language,
        residual: Vec<String>,
    ) -> QueryFilter {
        let mut ordered: Vec<&LexiconMatch> = matches.iter().collect();
        ordered.sort_by_key(|m| (m.span, m.dimension));

        let mut cuisine_tags = BTreeSet::new();
        let mut feature_tags = BTreeSet::new();
        let mut dish_keywords = BTreeSet::new();
        let mut price_range: Option<PriceBand> = None;
        let mut location: Option<LocationConstraint> = None;

        for hit in ordered {
            match hit.dimension {
                Dimension::Cuisine => {
                    cuisine_tags.insert(hit.tag.clone());
                }
                Dimension::Feature => {
                    feature_tags.insert(hit.tag.clone());
                }
                Dimension::Dish => {
                    dish_keywords.insert(hit.tag.clone());
                }
                Dimension::Price => {
                    let band = match hit.tag.parse::<PriceBand>() {
                        Ok(band) => band,
                        Err(e) => {
                            tracing::warn!("Skipping price signal {:?}: {}", hit.matched, e);
                            continue;
                        }
                    };
                    match price_range {
                        None => price_range = Some(band),
                        Some(kept) if kept != band => {
                            tracing::debug!(
                                "Ignoring conflicting price signal {:?} ({}), keeping first",
                                hit.matched,
                                hit.tag
                            );
                        }
                        Some(_) => {}
                    }
                }
                Dimension::Location => {
                    if let Some(kept) = &location {
                        if kept.place != hit.tag {
                            tracing::debug!(
                                "Ignoring additional place {:?}, keeping {:?}",
                                hit.tag,
                                kept.place
                            );
                        }
                        continue;
                    }
                    match self.lexicon.place(&hit.tag) {
                        Some(place) => {
                            location = Some(LocationConstraint {
                                place: hit.tag.clone(),
                                latitude: place.latitude,
                                longitude: place.longitude,
                                radius_m: self.location_radius_m,
                            });
                        }
                        None => tracing::warn!("Place {:?} missing from lexicon", hit.tag),
                    }
                }
            }
        }

        QueryFilter::new(
            language,
            cuisine_tags,
            price_range,
            feature_tags,
            dish_keywords,
            location,
            residual,
            self.max_results,
        )
    }
}

/// Check if a restaurant satisfies every hard constraint of a filter
///
/// Empty constraint sets accept everything. Dishes are alternatives: one of
/// them on the menu is enough. A location constraint rejects restaurants
/// without coordinates.
#[inline]
pub fn satisfies_constraints(restaurant: &Restaurant, filter: &QueryFilter) -> bool {
    if !filter.cuisine_tags().is_subset(&restaurant.cuisine) {
        return false;
    }

    if !filter.feature_tags().is_subset(&restaurant.features) {
        return false;
    }

    if let Some(band) = filter.price_range() {
        if !band.contains(restaurant.price_range) {
            return false;
        }
    }

    if !filter.dish_keywords().is_empty() && count_served_dishes(restaurant, filter.dish_keywords()) == 0 {
        return false;
    }

    if let Some(location) = filter.location() {
        return matches_location(restaurant, location);
    }

    true
}

/// Number of dish keywords found in the restaurant's menu item names
pub fn count_served_dishes(restaurant: &Restaurant, dishes: &BTreeSet<String>) -> usize {
    if dishes.is_empty() || restaurant.menu_items.is_empty() {
        return 0;
    }

    let menu: Vec<String> = restaurant
        .menu_items
        .iter()
        .map(|item| tokenize(&item.name).join(" "))
        .collect();

    dishes
        .iter()
        .filter(|dish| menu.iter().any(|name| name.contains(dish.as_str())))
        .count()
}

/// Check if a restaurant lies within a location constraint
#[inline]
pub fn matches_location(restaurant: &Restaurant, location: &LocationConstraint) -> bool {
    restaurant
        .coordinates()
        .map(|(lat, lon)| is_within_radius(lat, lon, location))
        .unwrap_or(false)
}
