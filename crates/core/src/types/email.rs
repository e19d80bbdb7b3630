//! Email addresses of admins and salon clients.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@domain")]
    Malformed,
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A trimmed, lowercased email address.
///
/// Lowercasing at parse time keeps admin login and client lookups
/// case-insensitive without `CITEXT`. Validation is structural only: one `@`
/// with text on both sides and no inner whitespace. Deliverability is not
/// checked.
///
/// ```
/// use atelier_core::Email;
///
/// let email = Email::parse("  Anna@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "anna@example.com");
/// assert!(Email::parse("anna@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], contains whitespace, or is not `local@domain`
    /// with exactly one `@`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        match s.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(s.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Parse an optional field; `None` and blank strings mean "no email".
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank value is not a valid email.
    pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>, EmailError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::parse(value).map(Some),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for raw in [
            "owner@atelier.test",
            "first.last+booking@mail.example.co.uk",
            "a@b.c",
        ] {
            assert!(Email::parse(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email = Email::parse("  Client@Salon.Example ").unwrap();
        assert_eq!(email.as_str(), "client@salon.example");
        assert_eq!(email.to_string(), "client@salon.example");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@atelier.test"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("owner@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("an na@b.c"), Err(EmailError::Whitespace));

        let long = format!("{}@atelier.test", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: Email::MAX_LENGTH })
        );
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(Email::parse_optional(None), Ok(None));
        assert_eq!(Email::parse_optional(Some("   ")), Ok(None));
        assert_eq!(
            Email::parse_optional(Some("x@y.z")).unwrap().unwrap().as_str(),
            "x@y.z"
        );
        assert!(Email::parse_optional(Some("nope")).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let email: Email = serde_json::from_str(r#""Owner@Atelier.Test""#).unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""owner@atelier.test""#);
        assert!(serde_json::from_str::<Email>(r#""not-an-email""#).is_err());
    }
}
