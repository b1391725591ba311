use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::Language;

/// Request to search restaurants from a free-form message
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    pub message: String,
    #[serde(default, alias = "lang")]
    #[validate(custom(function = "validate_language_hint"))]
    pub language: Option<String>,
}

impl SearchRequest {
    /// Language hint, if one was sent and is recognised
    pub fn language_hint(&self) -> Option<Language> {
        self.language.as_deref().and_then(|hint| hint.parse().ok())
    }
}

fn validate_language_hint(hint: &str) -> Result<(), ValidationError> {
    hint.parse::<Language>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("language_hint"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_language_hint() {
        let req = SearchRequest {
            message: "Pizza".to_string(),
            language: Some("de-AT".to_string()),
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.language_hint(), Some(Language::De));
    }

    #[test]
    fn test_missing_language_hint() {
        let req: SearchRequest = serde_json::from_str(r#"{"message": "cheap food"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.language_hint(), None);
    }

    #[test]
    fn test_invalid_language_hint() {
        let req = SearchRequest {
            message: "Pizza".to_string(),
            language: Some("fr".to_string()),
        };
        assert!(req.validate().is_err());
    }
}
