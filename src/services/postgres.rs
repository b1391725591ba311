use crate::core::distance::calculate_bounding_box;
use crate::core::filters::{count_served_dishes, matches_location};
use crate::models::{MenuItem, PriceRange, QueryFilter, Restaurant};
use crate::services::gateway::{GatewayError, RepositoryGateway};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::time::Duration;

const FIND_CANDIDATES: &str = r#"
    SELECT r.id::text AS id, r.name, r.address, r.phone, r.website,
           COALESCE(r.cuisine, '{}') AS cuisine, r.price_range, r.opening_hours,
           COALESCE(r.features, '{}') AS features, r.rating, r.review_count, r.summary,
           r.latitude, r.longitude, r.menu_url,
           COALESCE(r.data_sources, '{}') AS data_sources, r.last_verified,
           COALESCE(
               (SELECT jsonb_agg(jsonb_build_object(
                           'name', m.name, 'price', m.price,
                           'price_text', m.price_text, 'category', m.category)
                       ORDER BY m.name)
                FROM menu_items m
                WHERE m.restaurant_id = r.id),
               '[]'::jsonb) AS menu_items
    FROM restaurants r
    WHERE COALESCE(r.cuisine, '{}') @> $1
      AND COALESCE(r.features, '{}') @> $2
      AND ($3::text[] IS NULL OR r.price_range = ANY($3))
      AND ($4::float8 IS NULL OR (r.latitude BETWEEN $4 AND $5 AND r.longitude BETWEEN $6 AND $7))
      AND (cardinality($8::text[]) = 0 OR EXISTS (
          SELECT 1
          FROM menu_items m
          WHERE m.restaurant_id = r.id
            AND regexp_replace(
                    translate(replace(lower(m.name), 'ß', 'ss'),
                              'äöüáàâéèêëíìîïóòôúùûçñ', 'aouaaaeeeeiiiiooouuucn'),
                    '[^a-z0-9]+', ' ', 'g') LIKE ANY($8)))
"#;

/// Read-only PostgreSQL gateway
///
/// Expects a `restaurants` table with `text[]` columns for `cuisine`,
/// `features` and `data_sources` (NULL reads as empty), a text `price_range`
/// (either `low`/`mid`/`high` or the legacy `€` notation), a `jsonb`
/// `opening_hours` and a `menu_items` table keyed by `restaurant_id`. Schema
/// management lives outside this crate.
pub struct PostgresGateway {
    pool: PgPool,
}

impl PostgresGateway {
    /// Connect a new pool
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, GatewayError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl RepositoryGateway for PostgresGateway {
    async fn find_candidates(&self, filter: &QueryFilter) -> Result<Vec<Restaurant>, GatewayError> {
        let cuisine: Vec<String> = filter.cuisine_tags().iter().cloned().collect();
        let features: Vec<String> = filter.feature_tags().iter().cloned().collect();
        let price_labels: Option<Vec<String>> = filter.price_range().map(|band| {
            band.tiers()
                .into_iter()
                .flat_map(stored_price_labels)
                .map(str::to_string)
                .collect()
        });
        let dish_patterns: Vec<String> = filter
            .dish_keywords()
            .iter()
            .map(|dish| format!("%{}%", dish))
            .collect();
        let bbox = filter.location().map(|location| {
            calculate_bounding_box(location.latitude, location.longitude, location.radius_m / 1000.0)
        });

        let rows = sqlx::query(FIND_CANDIDATES)
            .bind(&cuisine)
            .bind(&features)
            .bind(&price_labels)
            .bind(bbox.map(|b| b.min_lat))
            .bind(bbox.map(|b| b.max_lat))
            .bind(bbox.map(|b| b.min_lon))
            .bind(bbox.map(|b| b.max_lon))
            .bind(&dish_patterns)
            .fetch_all(&self.pool)
            .await?;

        let mut candidates = rows
            .iter()
            .map(row_to_restaurant)
            .collect::<Result<Vec<_>, _>>()?;

        // The bounding box is coarse; apply the exact radius.
        if let Some(location) = filter.location() {
            candidates.retain(|restaurant| matches_location(restaurant, location));
        }

        // SQL folding covers common accents only; recheck with the full folding.
        if !filter.dish_keywords().is_empty() {
            candidates.retain(|restaurant| count_served_dishes(restaurant, filter.dish_keywords()) > 0);
        }

        tracing::debug!("PostgreSQL returned {} candidates", candidates.len());

        Ok(candidates)
    }
}

/// Labels a tier may be stored under
fn stored_price_labels(tier: PriceRange) -> Vec<&'static str> {
    match tier {
        PriceRange::Low => vec!["low", "€"],
        PriceRange::Mid => vec!["mid", "€€"],
        PriceRange::High => vec!["high", "€€€", "€€€€"],
    }
}

fn row_to_restaurant(row: &PgRow) -> Result<Restaurant, GatewayError> {
    let id: String = row.try_get("id")?;

    let price_label: String = row.try_get("price_range")?;
    let price_range = price_label
        .parse::<PriceRange>()
        .map_err(|e| GatewayError::Malformed(format!("restaurant {}: {}", id, e)))?;

    let review_count = row
        .try_get::<Option<i32>, _>("review_count")?
        .map(u32::try_from)
        .transpose()
        .map_err(|_| GatewayError::Malformed(format!("restaurant {}: negative review count", id)))?;

    let opening_hours: Option<Json<BTreeMap<String, String>>> = row.try_get("opening_hours")?;
    let cuisine: Vec<String> = row.try_get("cuisine")?;
    let features: Vec<String> = row.try_get("features")?;
    let Json(menu_items): Json<Vec<MenuItem>> = row.try_get("menu_items")?;

    Ok(Restaurant {
        name: row.try_get("name")?,
        cuisine: cuisine.into_iter().collect(),
        price_range,
        features: features.into_iter().collect(),
        rating: row.try_get("rating")?,
        review_count,
        address: row.try_get::<Option<String>, _>("address")?.unwrap_or_default(),
        phone: row.try_get("phone")?,
        website: row.try_get("website")?,
        opening_hours: opening_hours.map(|Json(hours)| hours),
        summary: row.try_get("summary")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        menu_items,
        menu_url: row.try_get("menu_url")?,
        data_sources: row.try_get("data_sources")?,
        last_verified: row.try_get("last_verified")?,
        id,
    })
}
