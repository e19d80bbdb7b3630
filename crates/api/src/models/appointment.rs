//! Appointments and their scheduling inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{
    AppointmentId, AppointmentStatus, ClientId, Email, Phone, ServiceId, TimeOfDay, TimeSlot,
};

use super::{ValidationError, required};

/// Client summary embedded in appointment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub id: ClientId,
    pub name: String,
    pub phone: Phone,
    pub email: Option<Email>,
}

/// Service summary embedded in appointment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub id: ServiceId,
    pub title: String,
}

/// A booked appointment with its client and service populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_id: ClientId,
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: AppointmentStatus,
    pub notes: String,
    pub client: ClientRef,
    pub service: ServiceRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A slot held on a given day, as returned by the availability endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub id: AppointmentId,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: AppointmentStatus,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub client_id: Option<ClientId>,
    pub service_id: Option<ServiceId>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

/// Validated appointment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub client_id: ClientId,
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub status: AppointmentStatus,
    pub notes: String,
}

impl AppointmentDraft {
    /// Whether this appointment must be checked against others on its day.
    #[must_use]
    pub const fn needs_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}

/// List filters: `?date=&status=&clientId=`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub client_id: Option<ClientId>,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `ValidationError` for any other format or an impossible date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return Err(ValidationError::new("date must use the YYYY-MM-DD format"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date must use the YYYY-MM-DD format"))
}

impl AppointmentInput {
    /// Validate a new appointment. Status defaults to `pending`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a reference or time field is missing,
    /// a date or time is malformed, or `endTime` is not after `startTime`.
    pub fn into_draft(self) -> Result<AppointmentDraft, ValidationError> {
        let client_id = self
            .client_id
            .ok_or_else(|| ValidationError::new("clientId is required"))?;
        let service_id = self
            .service_id
            .ok_or_else(|| ValidationError::new("serviceId is required"))?;
        let date = parse_date(&required("date", self.date)?)?;
        let start = required("startTime", self.start_time)?;
        let end = required("endTime", self.end_time)?;
        let slot = TimeSlot::parse(&start, &end).map_err(|e| ValidationError::new(e.to_string()))?;

        Ok(AppointmentDraft {
            client_id,
            service_id,
            date,
            slot,
            status: self.status.unwrap_or_default(),
            notes: self.notes.unwrap_or_default().trim().to_owned(),
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge(self, current: &Appointment) -> Self {
        Self {
            client_id: self.client_id.or(Some(current.client_id)),
            service_id: self.service_id.or(Some(current.service_id)),
            date: self
                .date
                .or_else(|| Some(current.date.format("%Y-%m-%d").to_string())),
            start_time: self.start_time.or_else(|| Some(current.start_time.to_string())),
            end_time: self.end_time.or_else(|| Some(current.end_time.to_string())),
            status: self.status.or(Some(current.status)),
            notes: self.notes.or_else(|| Some(current.notes.clone())),
        }
    }
}
