use crate::core::lexicon::{Lexicon, SurfaceForm};
use crate::core::normalize::NormalizedText;
use crate::models::Language;
use serde::Serialize;

/// Where a language decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageSource {
    Hint,
    Markers,
    Fallback,
}

/// Resolved language plus the marker counts behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageDecision {
    pub language: Language,
    pub source: LanguageSource,
    pub german_markers: usize,
    pub english_markers: usize,
}

/// Picks the language used for every later lexicon lookup
///
/// An explicit hint always wins. Otherwise marker words are counted per
/// language and the higher count wins; ties, including no markers at all,
/// go to the fallback language (English unless configured otherwise).
#[derive(Debug, Clone, Copy)]
pub struct LanguageResolver<'a> {
    lexicon: &'a Lexicon,
    fallback: Language,
}

impl<'a> LanguageResolver<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            fallback: Language::En,
        }
    }

    pub fn with_fallback(lexicon: &'a Lexicon, fallback: Language) -> Self {
        Self { lexicon, fallback }
    }

    pub fn resolve(&self, text: &NormalizedText, hint: Option<Language>) -> LanguageDecision {
        let german_markers = count_markers(&text.tokens, self.lexicon.markers(Language::De));
        let english_markers = count_markers(&text.tokens, self.lexicon.markers(Language::En));

        let (language, source) = match hint {
            Some(language) => (language, LanguageSource::Hint),
            None if german_markers > english_markers => (Language::De, LanguageSource::Markers),
            None if english_markers > german_markers => (Language::En, LanguageSource::Markers),
            None => (self.fallback, LanguageSource::Fallback),
        };

        LanguageDecision {
            language,
            source,
            german_markers,
            english_markers,
        }
    }
}

/// Count every position where any marker form matches
fn count_markers(tokens: &[String], markers: &[SurfaceForm]) -> usize {
    markers
        .iter()
        .map(|marker| {
            (0..tokens.len())
                .filter(|&start| marker.matches_at(tokens, start))
                .count()
        })
        .sum()
}
