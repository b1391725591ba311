use crate::core::{EmptyFilterPolicy, PipelineOptions};
use crate::models::{Language, ScoringWeights};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable prefix, e.g. `GRAZEATS__SERVER__PORT`
const ENV_PREFIX: &str = "GRAZEATS";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub lexicon: LexiconSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

/// Which repository backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayBackend {
    #[default]
    Dataset,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub backend: GatewayBackend,
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            backend: GatewayBackend::default(),
            dataset_path: default_dataset_path(),
            database_url: None,
            max_connections: None,
            min_connections: None,
        }
    }
}

fn default_dataset_path() -> PathBuf { PathBuf::from("data/graz_restaurants.json") }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconSettings {
    /// External lexicon file; the built-in one is used when unset
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    #[serde(default)]
    pub empty_filter_policy: EmptyFilterPolicy,
    #[serde(default = "default_location_radius_m")]
    pub location_radius_m: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_message_chars: default_max_message_chars(),
            empty_filter_policy: EmptyFilterPolicy::default(),
            location_radius_m: default_location_radius_m(),
        }
    }
}

fn default_max_results() -> usize { 5 }
fn default_max_message_chars() -> usize { 1000 }
fn default_location_radius_m() -> f64 { 800.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_cuisine_weight")]
    pub cuisine: u32,
    #[serde(default = "default_price_weight")]
    pub price: u32,
    #[serde(default = "default_feature_weight")]
    pub feature: u32,
    #[serde(default = "default_dish_weight")]
    pub dish: u32,
    #[serde(default = "default_location_weight")]
    pub location: u32,
    #[serde(default = "default_rating_bonus")]
    pub rating_bonus: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            cuisine: default_cuisine_weight(),
            price: default_price_weight(),
            feature: default_feature_weight(),
            dish: default_dish_weight(),
            location: default_location_weight(),
            rating_bonus: default_rating_bonus(),
        }
    }
}

fn default_cuisine_weight() -> u32 { 3 }
fn default_price_weight() -> u32 { 2 }
fn default_feature_weight() -> u32 { 1 }
fn default_dish_weight() -> u32 { 1 }
fn default_location_weight() -> u32 { 1 }
fn default_rating_bonus() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GRAZEATS__)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GRAZEATS__PIPELINE__MAX_RESULTS -> pipeline.max_results
            .add_source(environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=10).contains(&self.pipeline.max_results) {
            return Err(SettingsError::Invalid {
                key: "pipeline.max_results",
                reason: format!("must be between 1 and 10, got {}", self.pipeline.max_results),
            });
        }

        if self.pipeline.max_message_chars == 0 {
            return Err(SettingsError::Invalid {
                key: "pipeline.max_message_chars",
                reason: "must be positive".to_string(),
            });
        }

        if !(self.pipeline.location_radius_m.is_finite() && self.pipeline.location_radius_m > 0.0) {
            return Err(SettingsError::Invalid {
                key: "pipeline.location_radius_m",
                reason: format!("must be positive, got {}", self.pipeline.location_radius_m),
            });
        }

        self.default_language()?;

        self.weights().validate().map_err(|e| SettingsError::Invalid {
            key: "scoring.weights",
            reason: e.0,
        })?;

        if self.gateway.backend == GatewayBackend::Postgres && self.gateway.database_url.is_none() {
            return Err(SettingsError::Invalid {
                key: "gateway.database_url",
                reason: "required for the postgres backend".to_string(),
            });
        }

        Ok(())
    }

    /// Tie-break language, `en` when unset
    pub fn default_language(&self) -> Result<Language, SettingsError> {
        match &self.lexicon.default_language {
            None => Ok(Language::En),
            Some(code) => code.parse().map_err(|e: crate::models::UnknownLanguage| {
                SettingsError::Invalid {
                    key: "lexicon.default_language",
                    reason: e.to_string(),
                }
            }),
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        let w = &self.scoring.weights;
        ScoringWeights {
            cuisine: w.cuisine,
            price: w.price,
            feature: w.feature,
            dish: w.dish,
            location: w.location,
            rating_bonus: w.rating_bonus,
        }
    }

    pub fn to_pipeline_options(&self) -> Result<PipelineOptions, SettingsError> {
        Ok(PipelineOptions {
            max_results: self.pipeline.max_results,
            max_message_chars: self.pipeline.max_message_chars,
            empty_filter_policy: self.pipeline.empty_filter_policy,
            location_radius_m: self.pipeline.location_radius_m,
            default_language: self.default_language()?,
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_toml(raw: &str) -> Result<Settings, SettingsError> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        Settings::load_from(file.path())
    }

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.cuisine, 3);
        assert_eq!(weights.price, 2);
        assert_eq!(weights.feature, 1);
        assert_eq!(weights.dish, 1);
        assert_eq!(weights.location, 1);
        assert_eq!(weights.rating_bonus, 0.5);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = load_toml("").unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.gateway.backend, GatewayBackend::Dataset);
        assert_eq!(settings.pipeline.max_results, 5);
        assert_eq!(settings.pipeline.empty_filter_policy, EmptyFilterPolicy::NoIntent);

        let options = settings.to_pipeline_options().unwrap();
        assert_eq!(options, PipelineOptions::default());
        assert_eq!(settings.weights(), ScoringWeights::default());
    }

    #[test]
    fn test_sections_are_read() {
        let settings = load_toml(
            r#"
            [lexicon]
            default_language = "de"

            [pipeline]
            max_results = 3
            empty_filter_policy = "browse"
            location_radius_m = 500.0
            "#,
        )
        .unwrap();

        let options = settings.to_pipeline_options().unwrap();
        assert_eq!(options.max_results, 3);
        assert_eq!(options.empty_filter_policy, EmptyFilterPolicy::Browse);
        assert_eq!(options.location_radius_m, 500.0);
        assert_eq!(options.default_language, Language::De);
    }

    #[test]
    fn test_out_of_range_max_results() {
        let result = load_toml("[pipeline]\nmax_results = 11\n");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid { key: "pipeline.max_results", .. })
        ));
    }

    #[test]
    fn test_unknown_default_language() {
        let result = load_toml("[lexicon]\ndefault_language = \"fr\"\n");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid { key: "lexicon.default_language", .. })
        ));
    }

    #[test]
    fn test_inverted_weights_rejected() {
        let result = load_toml("[scoring.weights]\ncuisine = 1\nprice = 2\n");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid { key: "scoring.weights", .. })
        ));
    }

    #[test]
    fn test_postgres_requires_url() {
        let result = load_toml("[gateway]\nbackend = \"postgres\"\n");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid { key: "gateway.database_url", .. })
        ));
    }
}
