//! Text folding shared by message processing and lexicon loading.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// A message folded for matching, alongside the text it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Input exactly as received, for echo-back in diagnostics
    pub original: String,
    /// Folded tokens joined by single spaces
    pub text: String,
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Fold text for matching
///
/// Lower-cases, decomposes (NFD) and drops combining marks so `ü` becomes `u`,
/// expands `ß` to `ss`, turns every non-alphanumeric character into a separator
/// and collapses whitespace.
///
/// ```
/// use graz_eats::core::normalize::normalize;
///
/// let normalized = normalize("Günstige  Öffnungszeiten, bitte!");
/// assert_eq!(normalized.text, "gunstige offnungszeiten bitte");
/// assert_eq!(normalized.original, "Günstige  Öffnungszeiten, bitte!");
/// ```
pub fn normalize(text: &str) -> NormalizedText {
    let tokens = tokenize(text);
    NormalizedText {
        original: text.to_string(),
        text: tokens.join(" "),
        tokens,
    }
}

/// Folded tokens only
pub fn tokenize(text: &str) -> Vec<String> {
    let mut folded = String::with_capacity(text.len());

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c == 'ß' || c == 'ẞ' {
            folded.push_str("ss");
            continue;
        }
        if c.is_alphanumeric() {
            folded.extend(c.to_lowercase());
        } else {
            folded.push(' ');
        }
    }

    folded.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_case_and_diacritics() {
        assert_eq!(normalize("Vegane Restaurants in der Nähe").text, "vegane restaurants in der nahe");
        assert_eq!(normalize("Café CRÊPE").text, "cafe crepe");
        assert_eq!(normalize("Straßgang").text, "strassgang");
    }

    #[test]
    fn test_strips_punctuation_and_collapses_whitespace() {
        let normalized = normalize("  cheap,   italian...food?! ");
        assert_eq!(normalized.tokens, vec!["cheap", "italian", "food"]);
        assert_eq!(normalized.text, "cheap italian food");
    }

    #[test]
    fn test_hyphenated_words_split() {
        assert_eq!(tokenize("Wi-Fi & kaiser-josef-platz"), vec!["wi", "fi", "kaiser", "josef", "platz"]);
    }

    #[test]
    fn test_empty_input() {
        let normalized = normalize("");
        assert!(normalized.is_empty());
        assert_eq!(normalized.text, "");

        assert!(normalize(" ?! ").is_empty());
    }

    #[test]
    fn test_keeps_original() {
        let normalized = normalize("Öffnungszeiten");
        assert_eq!(normalized.original, "Öffnungszeiten");
        assert_eq!(normalized.text, "offnungszeiten");
    }
}
