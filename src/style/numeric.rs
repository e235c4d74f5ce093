//! Digit extraction for user-entered numeric text.
//!
//! Font sizes arrive as free text (`"24px"`, `"size 18"`). Every ASCII digit
//! is kept in order and the result is parsed as base 10.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Text could not be coerced into an integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericParseError {
    #[error("text has no digit: '{0}', so it cannot be converted to int")]
    NoDigit(String),

    #[error("digits in '{0}' do not fit into an integer")]
    Overflow(String),
}

/// Concatenate the digits of `text` and parse them.
///
/// # Example
/// ```ignore
/// assert_eq!(parse_int("24px"), Ok(24));
/// assert_eq!(parse_int("a1b2c3"), Ok(123));
/// ```
pub fn parse_int(text: &str) -> Result<u32, NumericParseError> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(NumericParseError::NoDigit(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| NumericParseError::Overflow(text.to_string()))
}

/// Memoizing front for [`parse_int`].
///
/// Owned by whoever resolves settings; results are identical to the uncached
/// function.
#[derive(Debug, Default)]
pub struct DigitCache {
    entries: FxHashMap<String, Result<u32, NumericParseError>>,
}

impl DigitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, text: &str) -> Result<u32, NumericParseError> {
        if let Some(cached) = self.entries.get(text) {
            return cached.clone();
        }
        let parsed = parse_int(text);
        self.entries.insert(text.to_string(), parsed.clone());
        parsed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_suffix() {
        assert_eq!(parse_int("24px"), Ok(24));
    }

    #[test]
    fn test_parse_int_interleaved() {
        assert_eq!(parse_int("a1b2c3"), Ok(123));
    }

    #[test]
    fn test_parse_int_leading_zero() {
        assert_eq!(parse_int("007"), Ok(7));
    }

    #[test]
    fn test_parse_int_no_digit() {
        let err = parse_int("large").unwrap_err();
        assert_eq!(err, NumericParseError::NoDigit("large".to_string()));
        assert!(err.to_string().contains("no digit"));
        assert!(parse_int("").is_err());
    }

    #[test]
    fn test_parse_int_overflow() {
        assert!(matches!(
            parse_int("99999999999999999999"),
            Err(NumericParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_digit_cache_matches_uncached() {
        let mut cache = DigitCache::new();
        assert_eq!(cache.parse("18px"), parse_int("18px"));
        assert_eq!(cache.parse("18px"), Ok(18));
        assert_eq!(cache.parse("none"), parse_int("none"));
        assert_eq!(cache.len(), 2);
    }
}
