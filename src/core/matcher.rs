use crate::core::lexicon::Lexicon;
use crate::core::normalize::NormalizedText;
use crate::models::{Dimension, Language};
use serde::Serialize;

/// Half-open range of token positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// One lexicon hit in a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconMatch {
    pub dimension: Dimension,
    pub tag: String,
    pub span: TokenSpan,
    /// The message tokens covered by the match
    pub matched: String,
}

/// Lexicon hits in message order plus the tokens nothing claimed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    pub matches: Vec<LexiconMatch>,
    pub residual: Vec<String>,
}

/// Maps normalized tokens onto canonical tags
///
/// Within one dimension surface forms are tried longest first and every token
/// can be claimed at most once, so "thai curry" wins over "curry" when both are
/// listed. Different dimensions match independently of each other.
///
/// The resolved language's tables claim tokens first. Tokens nothing claimed
/// are then offered to the other language's tables, so "günstige italian food"
/// keeps its price signal. A token both languages know is read in the resolved
/// language only.
///
/// Negation is not understood: "not vegan" still yields `vegan_options`.
#[derive(Debug, Clone, Copy)]
pub struct LexiconMatcher<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> LexiconMatcher<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn find_matches(&self, text: &NormalizedText, language: Language) -> MatchOutcome {
        let tokens = &text.tokens;
        let mut matches = Vec::new();
        let mut claimed_anywhere = vec![false; tokens.len()];

        for dimension in Dimension::ALL {
            let mut claimed = vec![false; tokens.len()];
            self.claim(tokens, dimension, language, &mut claimed, &mut matches);
            mark(&mut claimed_anywhere, &claimed);
        }
        let primary = matches.len();

        // Places are shared between languages and were covered above
        let unclaimed = claimed_anywhere.clone();
        for dimension in Dimension::ALL {
            if dimension == Dimension::Location {
                continue;
            }
            let mut claimed = unclaimed.clone();
            self.claim(tokens, dimension, language.other(), &mut claimed, &mut matches);
            mark(&mut claimed_anywhere, &claimed);
        }

        matches.sort_by(|a, b| {
            a.span
                .cmp(&b.span)
                .then_with(|| a.dimension.cmp(&b.dimension))
        });

        let residual = tokens
            .iter()
            .zip(&claimed_anywhere)
            .filter(|(_, taken)| !**taken)
            .map(|(token, _)| token.clone())
            .collect();

        tracing::debug!(
            "Lexicon matched {} signal(s) for language {} and {} from {}",
            primary,
            language,
            matches.len() - primary,
            language.other()
        );

        MatchOutcome { matches, residual }
    }

    /// Claim free tokens for one dimension and language table
    fn claim(
        &self,
        tokens: &[String],
        dimension: Dimension,
        language: Language,
        claimed: &mut [bool],
        matches: &mut Vec<LexiconMatch>,
    ) {
        for form in self.lexicon.surfaces(dimension, language) {
            let width = form.width();
            let mut start = 0;

            while start + width <= tokens.len() {
                let free = claimed[start..start + width].iter().all(|taken| !taken);
                if free && form.matches_at(tokens, start) {
                    let end = start + width;
                    claimed[start..end].iter_mut().for_each(|taken| *taken = true);

                    matches.push(LexiconMatch {
                        dimension,
                        tag: form.tag().to_string(),
                        span: TokenSpan { start, end },
                        matched: tokens[start..end].join(" "),
                    });
                    start = end;
                } else {
                    start += 1;
                }
            }
        }
    }
}

fn mark(target: &mut [bool], claimed: &[bool]) {
    for (slot, taken) in target.iter_mut().zip(claimed) {
        *slot |= *taken;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;

    fn lexicon() -> Lexicon {
        Lexicon::builder()
            .synonym(Dimension::Cuisine, "indian", Language::En, "curry")
            .synonym(Dimension::Cuisine, "thai", Language::En, "thai curry")
            .synonym(Dimension::Cuisine, "italian", Language::En, "italian")
            .synonym(Dimension::Cuisine, "italian", Language::De, "italienisch*")
            .synonym(Dimension::Price, "low", Language::En, "cheap")
            .synonym(Dimension::Price, "high", Language::En, "expensive")
            .synonym(Dimension::Feature, "vegan_options", Language::En, "vegan")
            .synonym(Dimension::Feature, "vegan_options", Language::De, "vegane")
            .place("hauptplatz", 47.0707, 15.4382, &["Hauptplatz"])
            .build()
            .unwrap()
    }

    fn tags(outcome: &MatchOutcome, dimension: Dimension) -> Vec<&str> {
        outcome
            .matches
            .iter()
            .filter(|m| m.dimension == dimension)
            .map(|m| m.tag.as_str())
            .collect()
    }

    #[test]
    fn test_multiple_dimensions() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("cheap italian food"), Language::En);

        assert_eq!(tags(&outcome, Dimension::Price), vec!["low"]);
        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["italian"]);
        assert_eq!(outcome.residual, vec!["food"]);
    }

    #[test]
    fn test_longest_match_first() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("green thai curry"), Language::En);

        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["thai"]);
        assert_eq!(outcome.matches[0].span, TokenSpan { start: 1, end: 3 });
        assert_eq!(outcome.matches[0].matched, "thai curry");
    }

    #[test]
    fn test_shorter_form_still_matches_elsewhere() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("thai curry or curry"), Language::En);

        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["thai", "indian"]);
    }

    #[test]
    fn test_whole_tokens_only() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("veganuary specials"), Language::En);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.residual, vec!["veganuary", "specials"]);
    }

    #[test]
    fn test_prefix_form_covers_inflection() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("italienische Küche"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["italian"]);
    }

    #[test]
    fn test_other_language_fills_unclaimed_tokens() {
        let lexicon = Lexicon::builder()
            .synonym(Dimension::Price, "low", Language::De, "günstig*")
            .synonym(Dimension::Cuisine, "italian", Language::En, "italian")
            .build()
            .unwrap();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("günstige italian food"), Language::En);

        assert_eq!(tags(&outcome, Dimension::Price), vec!["low"]);
        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["italian"]);
        assert_eq!(outcome.residual, vec!["food"]);
    }

    #[test]
    fn test_resolved_language_claims_first() {
        let lexicon = Lexicon::builder()
            .synonym(Dimension::Cuisine, "indian", Language::En, "curry")
            .synonym(Dimension::Cuisine, "thai", Language::De, "curry")
            .build()
            .unwrap();
        let matcher = LexiconMatcher::new(&lexicon);

        let outcome = matcher.find_matches(&normalize("curry"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["thai"]);

        let outcome = matcher.find_matches(&normalize("curry"), Language::En);
        assert_eq!(tags(&outcome, Dimension::Cuisine), vec!["indian"]);
    }

    #[test]
    fn test_builtin_stems_ignore_unrelated_words() {
        let lexicon = Lexicon::builtin().unwrap();
        let matcher = LexiconMatcher::new(&lexicon);

        let outcome = matcher.find_matches(&normalize("Gibt es im Edelweiss vegane Gerichte?"), Language::De);
        assert!(tags(&outcome, Dimension::Price).is_empty());
        assert_eq!(tags(&outcome, Dimension::Feature), vec!["vegan_options"]);

        let outcome = matcher.find_matches(&normalize("Ist das Nobelpreis-Lokal gut?"), Language::De);
        assert!(tags(&outcome, Dimension::Price).is_empty());

        let outcome = matcher.find_matches(&normalize("ein edles Lokal, eher teuer"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Price), vec!["high", "high"]);
    }

    #[test]
    fn test_builtin_lend_needs_place_context() {
        let lexicon = Lexicon::builtin().unwrap();
        let matcher = LexiconMatcher::new(&lexicon);

        let outcome = matcher.find_matches(&normalize("I need to lend money for pizza"), Language::En);
        assert!(tags(&outcome, Dimension::Location).is_empty());

        let outcome = matcher.find_matches(&normalize("Pizza am Lend"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Location), vec!["lend"]);
    }

    #[test]
    fn test_builtin_dish_keywords() {
        let lexicon = Lexicon::builtin().unwrap();
        let matcher = LexiconMatcher::new(&lexicon);

        let outcome = matcher.find_matches(&normalize("Wo gibt es Tafelspitz?"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Dish), vec!["tafelspitz"]);
        assert!(tags(&outcome, Dimension::Cuisine).is_empty());

        let outcome = matcher.find_matches(&normalize("Käsespätzle und Apfelstrudel"), Language::De);
        assert_eq!(tags(&outcome, Dimension::Dish), vec!["kasespatzle", "strudel"]);
        assert_eq!(outcome.residual, vec!["und"]);
    }

    #[test]
    fn test_places_match_in_any_language() {
        let lexicon = lexicon();
        for language in Language::ALL {
            let outcome = LexiconMatcher::new(&lexicon)
                .find_matches(&normalize("near the Hauptplatz"), language);
            assert_eq!(tags(&outcome, Dimension::Location), vec!["hauptplatz"]);
        }
    }

    #[test]
    fn test_matches_are_in_message_order() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("expensive or cheap"), Language::En);
        assert_eq!(tags(&outcome, Dimension::Price), vec!["high", "low"]);
    }

    #[test]
    fn test_negation_is_not_understood() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon)
            .find_matches(&normalize("not vegan"), Language::En);
        assert_eq!(tags(&outcome, Dimension::Feature), vec!["vegan_options"]);
        assert_eq!(outcome.residual, vec!["not"]);
    }

    #[test]
    fn test_empty_text() {
        let lexicon = lexicon();
        let outcome = LexiconMatcher::new(&lexicon).find_matches(&normalize(""), Language::En);
        assert_eq!(outcome, MatchOutcome::default());
    }
}
