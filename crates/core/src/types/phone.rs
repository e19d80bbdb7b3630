//! Phone number type.
//!
//! Clients are keyed by phone number, so two spellings of the same number
//! (`+7 (900) 123-45-67` and `+79001234567`) must normalize to one value.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains no digits.
    #[error("phone cannot be empty")]
    Empty,
    /// The input contains characters other than digits and separators.
    #[error("phone contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// Too few or too many digits.
    #[error("phone must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A normalized phone number: an optional leading `+` followed by digits.
///
/// Spaces, dashes, dots and parentheses are accepted as separators and
/// dropped.
///
/// ```
/// use atelier_core::Phone;
///
/// let phone = Phone::parse("+7 (900) 123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+79001234567");
/// assert!(Phone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits (short local numbers).
    pub const MIN_DIGITS: usize = 5;
    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or other
    /// unexpected characters, or has a digit count outside
    /// `MIN_DIGITS..=MAX_DIGITS`.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        let (plus, rest) = s.strip_prefix('+').map_or((false, s), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        if plus {
            digits.insert(0, '+');
        }
        Ok(Self(digits))
    }

    /// Returns the normalized phone number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_are_dropped() {
        assert_eq!(Phone::parse("8 900 123-45-67").unwrap().as_str(), "89001234567");
        assert_eq!(Phone::parse("(900).123.4567").unwrap().as_str(), "9001234567");
    }

    #[test]
    fn test_leading_plus_is_kept() {
        assert_eq!(Phone::parse(" +1 555 0100 ").unwrap().as_str(), "+15550100");
    }

    #[test]
    fn test_same_number_different_spelling() {
        assert_eq!(
            Phone::parse("+7 (900) 123-45-67").unwrap(),
            Phone::parse("+79001234567").unwrap()
        );
    }

    #[test]
    fn test_rejects_letters() {
        assert_eq!(Phone::parse("555-CALL"), Err(PhoneError::InvalidCharacter('C')));
    }

    #[test]
    fn test_rejects_plus_in_the_middle() {
        assert_eq!(Phone::parse("555+0100"), Err(PhoneError::InvalidCharacter('+')));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse(" - "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_rejects_bad_length() {
        assert!(matches!(Phone::parse("1234"), Err(PhoneError::InvalidLength { .. })));
        assert!(matches!(
            Phone::parse("1234567890123456"),
            Err(PhoneError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_serde_normalizes_and_validates() {
        let phone: Phone = serde_json::from_str(r#""+7 (900) 123-45-67""#).unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), r#""+79001234567""#);
        assert!(serde_json::from_str::<Phone>(r#""555-CALL""#).is_err());
        assert!(serde_json::from_str::<Phone>(r#""  ""#).is_err());
    }
}
