//! CRM clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{ClientId, Email, Phone};

use super::{ValidationError, required};

/// A salon client. Phone numbers are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: Phone,
    pub email: Option<Email>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Validated client fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub phone: Phone,
    pub email: Option<Email>,
    pub notes: String,
}

impl ClientInput {
    /// Validate a new client.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name or phone is missing, the phone
    /// is malformed, or a non-blank email is invalid.
    pub fn into_draft(self) -> Result<ClientDraft, ValidationError> {
        let name = required("name", self.name)?;
        let phone = Phone::parse(&required("phone", self.phone)?)
            .map_err(|e| ValidationError::new(e.to_string()))?;
        let email = Email::parse_optional(self.email.as_deref())
            .map_err(|e| ValidationError::new(e.to_string()))?;

        Ok(ClientDraft {
            name,
            phone,
            email,
            notes: self.notes.unwrap_or_default().trim().to_owned(),
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge(self, current: &Client) -> Self {
        Self {
            name: self.name.or_else(|| Some(current.name.clone())),
            phone: self.phone.or_else(|| Some(current.phone.to_string())),
            email: self
                .email
                .or_else(|| current.email.as_ref().map(ToString::to_string)),
            notes: self.notes.or_else(|| Some(current.notes.clone())),
        }
    }
}
