//! Country code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CountryCodeError {
    /// The input string is empty.
    #[error("country code cannot be empty")]
    Empty,
    /// The input is not 2 or 3 characters long.
    #[error("country code must be 2 or 3 letters")]
    InvalidLength,
    /// The input contains a non-alphabetic character.
    #[error("country code must contain only letters")]
    InvalidCharacter,
}

/// An ISO 3166-1 alpha-2 or alpha-3 country code (e.g. "EE", "FRA").
///
/// Codes are normalized to uppercase on parse, so `CountryCode::parse("ee")`
/// and `CountryCode::parse("EE")` compare equal. This is the key under which
/// favorites, recently-viewed entries, and notes are stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a `CountryCode` from a string, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not 2-3 characters long,
    /// or contains non-ASCII-alphabetic characters.
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        if s.is_empty() {
            return Err(CountryCodeError::Empty);
        }

        if !matches!(s.len(), 2 | 3) {
            return Err(CountryCodeError::InvalidLength);
        }

        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError::InvalidCharacter);
        }

        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the code as an uppercase string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CountryCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let code = CountryCode::parse("ee").expect("valid code");
        assert_eq!(code.as_str(), "EE");
        assert_eq!(code, CountryCode::parse("EE").expect("valid code"));
    }

    #[test]
    fn test_parse_alpha3() {
        let code = CountryCode::parse("fra").expect("valid code");
        assert_eq!(code.as_str(), "FRA");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(CountryCode::parse(""), Err(CountryCodeError::Empty)));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            CountryCode::parse("e"),
            Err(CountryCodeError::InvalidLength)
        ));
        assert!(matches!(
            CountryCode::parse("eeee"),
            Err(CountryCodeError::InvalidLength)
        ));
    }

    #[test]
    fn test_parse_non_alphabetic() {
        assert!(matches!(
            CountryCode::parse("e1"),
            Err(CountryCodeError::InvalidCharacter)
        ));
    }
}
