//! Salon contact block (a single row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, optional, required};

/// Contact details shown in the site footer and contacts page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub phone: String,
    pub instagram: String,
    pub address: String,
    pub email: Option<String>,
    pub working_hours: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub working_hours: Option<String>,
}

/// Validated contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub phone: String,
    pub instagram: String,
    pub address: String,
    pub email: Option<String>,
    pub working_hours: Option<String>,
}

impl ContactInput {
    /// Validate the contact block. Phone is displayed verbatim, so only
    /// presence is checked.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the phone is missing.
    pub fn into_draft(self) -> Result<ContactDraft, ValidationError> {
        Ok(ContactDraft {
            phone: required("phone", self.phone)?,
            instagram: self.instagram.unwrap_or_default().trim().to_owned(),
            address: self.address.unwrap_or_default().trim().to_owned(),
            email: optional(self.email),
            working_hours: optional(self.working_hours),
        })
    }

    /// Fill omitted fields from the stored block, if there is one.
    #[must_use]
    pub fn merge(self, current: Option<&Contact>) -> Self {
        let Some(current) = current else {
            return self;
        };
        Self {
            phone: self.phone.or_else(|| Some(current.phone.clone())),
            instagram: self.instagram.or_else(|| Some(current.instagram.clone())),
            address: self.address.or_else(|| Some(current.address.clone())),
            email: self.email.or_else(|| current.email.clone()),
            working_hours: self.working_hours.or_else(|| current.working_hours.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_upsert_requires_phone() {
        let err = ContactInput {
            instagram: Some("@atelier".into()),
            ..Default::default()
        }
        .merge(None)
        .into_draft()
        .unwrap_err();
        assert_eq!(err.to_string(), "phone is required");
    }

    #[test]
    fn test_partial_upsert_keeps_existing() {
        let current = Contact {
            phone: "+7 900 123-45-67".into(),
            instagram: "@atelier".into(),
            address: "Main st. 1".into(),
            email: None,
            working_hours: Some("10:00-20:00".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let draft = ContactInput {
            address: Some("Main st. 2".into()),
            ..Default::default()
        }
        .merge(Some(&current))
        .into_draft()
        .unwrap();
        assert_eq!(draft.phone, "+7 900 123-45-67");
        assert_eq!(draft.address, "Main st. 2");
        assert_eq!(draft.working_hours.as_deref(), Some("10:00-20:00"));
    }
}
