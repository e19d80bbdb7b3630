//! Salon services shown on the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::ServiceId;

use super::{ValidationError, optional, required};

/// A service offered by the salon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Validated service fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl ServiceInput {
    /// Validate a new service.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the title is missing or blank.
    pub fn into_draft(self) -> Result<ServiceDraft, ValidationError> {
        Ok(ServiceDraft {
            title: required("title", self.title)?,
            description: self.description.unwrap_or_default().trim().to_owned(),
            image: optional(self.image),
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge(self, current: &Service) -> Self {
        Self {
            title: self.title.or_else(|| Some(current.title.clone())),
            description: self.description.or_else(|| Some(current.description.clone())),
            image: self.image.or_else(|| current.image.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stored() -> Service {
        Service {
            id: ServiceId::new(1),
            title: "Manicure".into(),
            description: "Classic".into(),
            image: Some("/uploads/m.png".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_requires_title() {
        assert!(ServiceInput::default().into_draft().is_err());
        let draft = ServiceInput {
            title: Some("Pedicure".into()),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.description, "");
        assert_eq!(draft.image, None);
    }

    #[test]
    fn test_merge_keeps_omitted_fields() {
        let draft = ServiceInput {
            description: Some("Gel polish".into()),
            ..Default::default()
        }
        .merge(&stored())
        .into_draft()
        .unwrap();
        assert_eq!(draft.title, "Manicure");
        assert_eq!(draft.description, "Gel polish");
        assert_eq!(draft.image.as_deref(), Some("/uploads/m.png"));
    }

    #[test]
    fn test_blank_image_clears() {
        let draft = ServiceInput {
            image: Some(String::new()),
            ..Default::default()
        }
        .merge(&stored())
        .into_draft()
        .unwrap();
        assert_eq!(draft.image, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(stored()).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["id"], 1);
    }
}
