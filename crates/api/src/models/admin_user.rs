use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{AdminUserId, Email};

pub use atelier_core::AdminRole;

/// An admin account as returned by `/api/auth/me`. The password hash is not
/// part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who is calling, as far as a verified token says. Handlers that need the
/// admin's current name or existence look the id up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: String,
    pub role: AdminRole,
}
