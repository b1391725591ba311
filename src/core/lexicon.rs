//! Declarative synonym tables.
//!
//! A lexicon maps surface forms to canonical tags per dimension and language,
//! lists the marker words used for language detection, and knows the coordinates
//! of named places. It is loaded once and shared read-only between requests.

use crate::core::normalize::tokenize;
use crate::models::{Dimension, InvalidPriceTag, Language, PriceBand};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lexicon shipped with the crate
const BUILTIN_LEXICON: &str = include_str!("../../config/lexicon.toml");

/// Shortest stem a `*` form may have; shorter stems swallow unrelated words
pub const MIN_PREFIX_CHARS: usize = 6;

/// Errors raised while loading or assembling a lexicon
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid price tag in lexicon: {0}")]
    InvalidPriceTag(#[from] InvalidPriceTag),

    #[error("surface form {0:?} is empty after normalization")]
    EmptySurface(String),

    #[error("prefix form {surface:?} needs a stem of at least {min} characters")]
    ShortPrefix { surface: String, min: usize },

    #[error("surface form {surface:?} maps to both {first:?} and {second:?} ({dimension}, {language})")]
    ConflictingSurface {
        dimension: Dimension,
        language: Language,
        surface: String,
        first: String,
        second: String,
    },

    #[error("place {0:?} has invalid coordinates")]
    InvalidPlace(String),

    #[error("location synonyms must be declared as places, got tag {0:?}")]
    LocationSynonym(String),
}

/// One normalized surface form
///
/// A trailing `*` in the raw form lets the last token match as a prefix, so
/// `italienisch*` also covers `italienische` and `italienischen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceForm {
    tokens: Vec<String>,
    prefix: bool,
    tag: String,
}

impl SurfaceForm {
    pub fn parse(raw: &str, tag: impl Into<String>) -> Result<Self, LexiconError> {
        let trimmed = raw.trim();
        let (body, prefix) = match trimmed.strip_suffix('*') {
            Some(body) => (body, true),
            None => (trimmed, false),
        };

        let tokens = tokenize(body);
        let Some(last) = tokens.last() else {
            return Err(LexiconError::EmptySurface(raw.to_string()));
        };
        if prefix && last.chars().count() < MIN_PREFIX_CHARS {
            return Err(LexiconError::ShortPrefix {
                surface: raw.to_string(),
                min: MIN_PREFIX_CHARS,
            });
        }

        Ok(Self {
            tokens,
            prefix,
            tag: tag.into(),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of tokens this form spans
    pub fn width(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Normalized text, with the trailing `*` for prefix forms
    pub fn text(&self) -> String {
        let joined = self.tokens.join(" ");
        if self.prefix {
            format!("{joined}*")
        } else {
            joined
        }
    }

    fn char_len(&self) -> usize {
        self.tokens.iter().map(|t| t.chars().count()).sum::<usize>() + self.tokens.len() - 1
    }

    /// Whether this form matches `tokens` starting at `start`
    pub fn matches_at(&self, tokens: &[String], start: usize) -> bool {
        let Some(window) = tokens.get(start..start + self.width()) else {
            return false;
        };

        let last = self.width() - 1;
        self.tokens.iter().zip(window).enumerate().all(|(i, (expected, actual))| {
            if i == last && self.prefix {
                actual.starts_with(expected.as_str())
            } else {
                actual == expected
            }
        })
    }
}

/// Coordinates of a named place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
}

/// Immutable synonym tables
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: Option<String>,
    markers: BTreeMap<Language, Vec<SurfaceForm>>,
    tables: BTreeMap<(Dimension, Language), Vec<SurfaceForm>>,
    places: BTreeMap<String, Place>,
}

impl Lexicon {
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    /// The lexicon embedded from `config/lexicon.toml`
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_toml_str(BUILTIN_LEXICON)
    }

    /// Load a lexicon from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = toml::from_str(raw)?;
        file.into_builder().build()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Surface forms for one dimension and language, longest first
    pub fn surfaces(&self, dimension: Dimension, language: Language) -> &[SurfaceForm] {
        self.tables
            .get(&(dimension, language))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Language marker forms
    pub fn markers(&self, language: Language) -> &[SurfaceForm] {
        self.markers
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn place(&self, key: &str) -> Option<Place> {
        self.places.get(key).copied()
    }
}

/// Assembles a [`Lexicon`] programmatically
///
/// All validation happens in [`LexiconBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct LexiconBuilder {
    version: Option<String>,
    markers: Vec<(Language, String)>,
    synonyms: Vec<(Dimension, String, Language, String)>,
    places: Vec<(String, f64, f64, Vec<String>)>,
}

impl LexiconBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn marker(mut self, language: Language, surface: impl Into<String>) -> Self {
        self.markers.push((language, surface.into()));
        self
    }

    pub fn synonym(
        mut self,
        dimension: Dimension,
        tag: impl Into<String>,
        language: Language,
        surface: impl Into<String>,
    ) -> Self {
        self.synonyms
            .push((dimension, tag.into(), language, surface.into()));
        self
    }

    /// Register a place; its names match in every language
    pub fn place(mut self, key: impl Into<String>, latitude: f64, longitude: f64, names: &[&str]) -> Self {
        self.places.push((
            key.into(),
            latitude,
            longitude,
            names.iter().map(|n| n.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<Lexicon, LexiconError> {
        let mut markers: BTreeMap<Language, Vec<SurfaceForm>> = BTreeMap::new();
        for (language, raw) in &self.markers {
            let form = SurfaceForm::parse(raw, language.code())?;
            let entry = markers.entry(*language).or_default();
            if !entry.contains(&form) {
                entry.push(form);
            }
        }

        let mut tables: BTreeMap<(Dimension, Language), Vec<SurfaceForm>> = BTreeMap::new();
        for (dimension, tag, language, raw) in &self.synonyms {
            let tag = match dimension {
                Dimension::Location => return Err(LexiconError::LocationSynonym(tag.clone())),
                Dimension::Price => {
                    tag.parse::<PriceBand>()?;
                    tag.clone()
                }
                // Dish tags are searched for inside folded menu item names
                Dimension::Dish => {
                    let folded = tokenize(tag).join(" ");
                    if folded.is_empty() {
                        return Err(LexiconError::EmptySurface(tag.clone()));
                    }
                    folded
                }
                Dimension::Cuisine | Dimension::Feature => tag.clone(),
            };
            let form = SurfaceForm::parse(raw, tag)?;
            insert_form(&mut tables, *dimension, *language, form)?;
        }

        let mut places = BTreeMap::new();
        for (key, latitude, longitude, names) in &self.places {
            if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
                return Err(LexiconError::InvalidPlace(key.clone()));
            }
            places.insert(
                key.clone(),
                Place {
                    latitude: *latitude,
                    longitude: *longitude,
                },
            );

            let names: Vec<&str> = if names.is_empty() {
                vec![key.as_str()]
            } else {
                names.iter().map(String::as_str).collect()
            };
            for name in names {
                for language in Language::ALL {
                    let form = SurfaceForm::parse(name, key.as_str())?;
                    insert_form(&mut tables, Dimension::Location, language, form)?;
                }
            }
        }

        for forms in tables.values_mut() {
            forms.sort_by_key(|form| {
                (
                    Reverse(form.width()),
                    Reverse(form.char_len()),
                    form.prefix,
                    form.text(),
                    form.tag.clone(),
                )
            });
        }

        Ok(Lexicon {
            version: self.version,
            markers,
            tables,
            places,
        })
    }
}

fn insert_form(
    tables: &mut BTreeMap<(Dimension, Language), Vec<SurfaceForm>>,
    dimension: Dimension,
    language: Language,
    form: SurfaceForm,
) -> Result<(), LexiconError> {
    let forms = tables.entry((dimension, language)).or_default();
    if let Some(existing) = forms
        .iter()
        .find(|f| f.tokens == form.tokens && f.prefix == form.prefix)
    {
        if existing.tag != form.tag {
            return Err(LexiconError::ConflictingSurface {
                dimension,
                language,
                surface: form.text(),
                first: existing.tag.clone(),
                second: form.tag,
            });
        }
        return Ok(());
    }
    forms.push(form);
    Ok(())
}

/// On-disk layout of a lexicon file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    markers: Synonyms,
    #[serde(default)]
    cuisine: BTreeMap<String, Synonyms>,
    #[serde(default)]
    price: BTreeMap<String, Synonyms>,
    #[serde(default)]
    feature: BTreeMap<String, Synonyms>,
    #[serde(default)]
    dish: BTreeMap<String, Synonyms>,
    #[serde(default)]
    places: BTreeMap<String, PlaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Synonyms {
    #[serde(default)]
    de: Vec<String>,
    #[serde(default)]
    en: Vec<String>,
}

impl Synonyms {
    fn by_language(self) -> [(Language, Vec<String>); 2] {
        [(Language::De, self.de), (Language::En, self.en)]
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlaceEntry {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    names: Vec<String>,
}

impl LexiconFile {
    fn into_builder(self) -> LexiconBuilder {
        let mut builder = LexiconBuilder {
            version: self.version,
            ..LexiconBuilder::default()
        };

        for (language, surfaces) in self.markers.by_language() {
            for surface in surfaces {
                builder = builder.marker(language, surface);
            }
        }

        let dimensions = [
            (Dimension::Cuisine, self.cuisine),
            (Dimension::Price, self.price),
            (Dimension::Feature, self.feature),
            (Dimension::Dish, self.dish),
        ];
        for (dimension, table) in dimensions {
            for (tag, synonyms) in table {
                for (language, surfaces) in synonyms.by_language() {
                    for surface in surfaces {
                        builder = builder.synonym(dimension, tag.as_str(), language, surface);
                    }
                }
            }
        }

        for (key, place) in self.places {
            builder.places.push((key, place.latitude, place.longitude, place.names));
        }

        builder
    }
}
