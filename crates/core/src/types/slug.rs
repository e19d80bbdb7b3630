//! URL slug type for articles, posts, products and catalog groupings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits and '-' (found '{0}')")]
    InvalidCharacter(char),
    /// The input starts or ends with '-', or contains "--".
    #[error("slug must not start or end with '-' or contain '--'")]
    MisplacedDash,
}

/// A URL path segment such as `spring-hair-care`.
///
/// ```
/// use atelier_core::Slug;
///
/// assert!(Slug::parse("spring-hair-care").is_ok());
/// assert!(Slug::parse("Spring Hair").is_err());
/// assert_eq!(Slug::from_title("Spring Hair Care!").as_str(), "spring-hair-care");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 120;

    /// Parse a slug, rejecting anything that is not already canonical.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// outside `[a-z0-9-]`, or has leading, trailing or doubled dashes.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedDash);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a human title.
    ///
    /// ASCII letters and digits are kept (lowercased); every other run of
    /// characters becomes a single dash. Returns `"item"` if nothing usable
    /// remains.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut pending_dash = false;
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        out.truncate(Self::MAX_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() {
            out.push_str("item");
        }
        Self(out)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("a").is_ok());
        assert!(Slug::parse("keratin-2025").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Hair"), Err(SlugError::InvalidCharacter('H')));
        assert_eq!(Slug::parse("hair care"), Err(SlugError::InvalidCharacter(' ')));
        assert_eq!(Slug::parse("-hair"), Err(SlugError::MisplacedDash));
        assert_eq!(Slug::parse("hair--care"), Err(SlugError::MisplacedDash));
        assert!(matches!(
            Slug::parse(&"a".repeat(121)),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_from_title() {
        assert_eq!(Slug::from_title("  Nail Care: 5 Tips ").as_str(), "nail-care-5-tips");
        assert_eq!(Slug::from_title("Уход за волосами").as_str(), "item");
        assert_eq!(Slug::from_title("Gel & Acrylic").as_str(), "gel-acrylic");
    }

    #[test]
    fn test_from_title_is_parseable() {
        let slug = Slug::from_title("Brows -- Lashes!!");
        assert!(Slug::parse(slug.as_str()).is_ok());
    }

    #[test]
    fn test_serde_rejects_non_canonical() {
        let slug: Slug = serde_json::from_str(r#""gel-acrylic""#).unwrap();
        assert_eq!(serde_json::to_string(&slug).unwrap(), r#""gel-acrylic""#);
        assert!(serde_json::from_str::<Slug>(r#""Gel Acrylic""#).is_err());
        assert!(serde_json::from_str::<Slug>(r#""-gel""#).is_err());
    }
}
