//! Typed integer ids.
//!
//! Every table uses a `SERIAL` primary key. Wrapping each one in its own type
//! means a `ClientId` cannot be passed where a `ServiceId` is expected, which
//! matters for appointments that carry both.

/// Define an `i32` id newtype.
///
/// The generated type serializes as a bare integer, converts to and from
/// `i32`, displays as the number, and maps to `INTEGER` columns when the
/// `postgres` feature is enabled.
///
/// ```rust
/// # use atelier_core::define_id;
/// define_id!(StylistId);
///
/// let id = StylistId::new(3);
/// assert_eq!(id.as_i32(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ServiceId);
define_id!(PortfolioItemId);
define_id!(CareArticleId);
define_id!(BlogPostId);

define_id!(ClientId);
define_id!(AppointmentId);

define_id!(ProductId);
define_id!(CategoryId);
define_id!(TagId);

define_id!(AdminUserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_a_bare_integer_in_json() {
        let id = ClientId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<ClientId>("42").unwrap(), id);
        assert!(serde_json::from_str::<ClientId>("\"42\"").is_err());
    }

    #[test]
    fn test_id_conversions() {
        let id = AppointmentId::from(7);
        assert_eq!(id.as_i32(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(id.to_string(), "7");
        assert_eq!("7".parse::<AppointmentId>().unwrap(), id);
        assert!("seven".parse::<AppointmentId>().is_err());
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut tags = vec![TagId::new(10), TagId::new(2), TagId::new(7)];
        tags.sort();
        assert_eq!(tags, [TagId::new(2), TagId::new(7), TagId::new(10)]);
    }
}
