//! Status and kind enums shared by the API and the site.

use serde::{Deserialize, Serialize};

/// Lifecycle of an appointment.
///
/// Only `pending` and `confirmed` appointments occupy their slot; completed
/// and cancelled ones are kept for history but never block a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "appointment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Requested, awaiting confirmation.
    #[default]
    Pending,
    /// Confirmed by the salon.
    Confirmed,
    /// Visit took place.
    Completed,
    /// Cancelled by either side.
    Cancelled,
}

impl AppointmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses that hold a time slot.
    pub const BLOCKING: [Self; 2] = [Self::Pending, Self::Confirmed];

    /// Whether an appointment in this status occupies its time slot.
    #[must_use]
    pub const fn blocks_slot(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid appointment status: {s}"))
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Can manage other admin accounts.
    SuperAdmin,
    /// Can manage content, clients and appointments.
    #[default]
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// Media kind of a portfolio item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portfolio_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioKind {
    #[default]
    Image,
    Video,
}

impl std::fmt::Display for PortfolioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_and_confirmed_block() {
        let blocking: Vec<_> = AppointmentStatus::ALL
            .into_iter()
            .filter(|s| s.blocks_slot())
            .collect();
        assert_eq!(blocking, AppointmentStatus::BLOCKING);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.to_string().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Pending);
    }

    #[test]
    fn test_admin_role_from_str() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        assert!("viewer".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_portfolio_kind_serde() {
        let kind: PortfolioKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, PortfolioKind::Video);
        assert_eq!(kind.to_string(), "video");
    }
}
