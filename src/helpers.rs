//! Shared helper functions for handlers.

use chrono::NaiveDateTime;
use validator::Validate;

use crate::error::DomainError;

/// Runs `validator` rules, reporting the first failing field.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), DomainError> {
    payload.validate().map_err(DomainError::from)
}

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` escaped.
pub fn contains_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Trims optional free text, mapping blank input to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" dela cruz "), "%dela cruz%");
        assert_eq!(contains_pattern("100%_"), "%100\\%\\_%");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
    }
}
