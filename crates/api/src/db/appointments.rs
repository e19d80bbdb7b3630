//! Appointment repository.
//!
//! Writes run inside a transaction: the active appointments of the target
//! day are loaded with `FOR UPDATE`, checked against the candidate slot with
//! [`TimeSlot::overlaps`], and only then is the row written. Two writers
//! racing for the same free slot both pass that check; the loser is stopped
//! by the `appointments_no_overlap` exclusion constraint and gets the same
//! [`RepositoryError::SlotTaken`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use atelier_core::{AppointmentId, AppointmentStatus, ClientId, Email, Phone, ServiceId, TimeOfDay, TimeSlot};

use super::{Constraints, RepositoryError};
use crate::models::{Appointment, AppointmentDraft, AppointmentFilter, BookedSlot, ClientRef, ServiceRef};

const SELECT: &str = "
    SELECT a.id, a.client_id, a.service_id, a.appointment_date, a.start_time, a.end_time,
           a.status, a.notes, a.created_at, a.updated_at,
           c.name AS client_name, c.phone AS client_phone, c.email AS client_email,
           s.title AS service_title
    FROM appointments a
    JOIN clients c ON c.id = a.client_id
    JOIN services s ON s.id = a.service_id";

const CONSTRAINTS: Constraints = Constraints::new(
    "appointment already exists",
    "clientId or serviceId does not reference an existing record",
);

#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: AppointmentId,
    client_id: ClientId,
    service_id: ServiceId,
    appointment_date: NaiveDate,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    status: AppointmentStatus,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    client_name: String,
    client_phone: Phone,
    client_email: Option<String>,
    service_title: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = RepositoryError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let email = Email::parse_optional(row.client_email.as_deref()).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid client email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            client_id: row.client_id,
            service_id: row.service_id,
            date: row.appointment_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            notes: row.notes,
            client: ClientRef {
                id: row.client_id,
                name: row.client_name,
                phone: row.client_phone,
                email,
            },
            service: ServiceRef {
                id: row.service_id,
                title: row.service_title,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    id: AppointmentId,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    status: AppointmentStatus,
}

impl From<SlotRow> for BookedSlot {
    fn from(row: SlotRow) -> Self {
        Self {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
        }
    }
}

/// First booked slot that collides with `candidate`, if any.
///
/// Slots that no longer block (completed, cancelled) are ignored.
#[must_use]
pub fn find_conflict(candidate: &TimeSlot, booked: &[BookedSlot]) -> Option<AppointmentId> {
    booked
        .iter()
        .filter(|b| b.status.blocks_slot())
        .find(|b| {
            TimeSlot::new(b.start_time, b.end_time)
                .is_ok_and(|existing| candidate.overlaps(&existing))
        })
        .map(|b| b.id)
}

/// Repository for appointments.
pub struct AppointmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepository<'a> {
    /// Create a new appointment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List appointments ordered by date and start time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "{SELECT}
             WHERE ($1::date IS NULL OR a.appointment_date = $1)
               AND ($2::appointment_status IS NULL OR a.status = $2)
               AND ($3::int IS NULL OR a.client_id = $3)
             ORDER BY a.appointment_date ASC, a.start_time ASC, a.id ASC"
        ))
        .bind(filter.date)
        .bind(filter.status)
        .bind(filter.client_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Active (pending or confirmed) slots on `date`, by start time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn booked_slots(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            "SELECT id, start_time, end_time, status FROM appointments
             WHERE appointment_date = $1 AND status IN ('pending', 'confirmed')
             ORDER BY start_time ASC",
        )
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an appointment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!("{SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Book an appointment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::SlotTaken` if an active appointment overlaps
    /// the slot, `RepositoryError::Conflict` if the client or service does
    /// not exist.
    #[instrument(skip(self, draft), fields(date = %draft.date, slot = %draft.slot))]
    pub async fn create(&self, draft: &AppointmentDraft) -> Result<Appointment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if draft.needs_slot() {
            ensure_slot_free(&mut tx, draft.date, &draft.slot, None).await?;
        }

        let id: AppointmentId = sqlx::query_scalar(
            "INSERT INTO appointments
                 (client_id, service_id, appointment_date, start_time, end_time, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(draft.client_id)
        .bind(draft.service_id)
        .bind(draft.date)
        .bind(draft.slot.start())
        .bind(draft.slot.end())
        .bind(draft.status)
        .bind(&draft.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        let appointment = fetch_in(&mut tx, id).await?;
        tx.commit().await.map_err(|e| CONSTRAINTS.map(e))?;

        tracing::info!(appointment_id = %id, "Appointment booked");
        Ok(appointment)
    }

    /// Overwrite an appointment with a merged draft.
    ///
    /// The appointment itself is excluded from the overlap check so that
    /// saving it unchanged never conflicts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such appointment exists,
    /// `RepositoryError::SlotTaken` on overlap, `RepositoryError::Conflict`
    /// for dangling references.
    #[instrument(skip(self, draft), fields(id = %id, date = %draft.date, slot = %draft.slot))]
    pub async fn update(
        &self,
        id: AppointmentId,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if draft.needs_slot() {
            ensure_slot_free(&mut tx, draft.date, &draft.slot, Some(id)).await?;
        }

        let updated = sqlx::query(
            "UPDATE appointments
             SET client_id = $2, service_id = $3, appointment_date = $4,
                 start_time = $5, end_time = $6, status = $7, notes = $8,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(draft.client_id)
        .bind(draft.service_id)
        .bind(draft.date)
        .bind(draft.slot.start())
        .bind(draft.slot.end())
        .bind(draft.status)
        .bind(&draft.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let appointment = fetch_in(&mut tx, id).await?;
        tx.commit().await.map_err(|e| CONSTRAINTS.map(e))?;

        Ok(appointment)
    }

    /// Delete an appointment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such appointment exists.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Reject `slot` on `date` if an active appointment (other than `exclude`)
/// overlaps it. Locks the day's active rows until the transaction ends.
async fn ensure_slot_free(
    conn: &mut PgConnection,
    date: NaiveDate,
    slot: &TimeSlot,
    exclude: Option<AppointmentId>,
) -> Result<(), RepositoryError> {
    let booked: Vec<BookedSlot> = sqlx::query_as::<_, SlotRow>(
        "SELECT id, start_time, end_time, status FROM appointments
         WHERE appointment_date = $1
           AND status IN ('pending', 'confirmed')
           AND ($2::int IS NULL OR id <> $2)
         FOR UPDATE",
    )
    .bind(date)
    .bind(exclude)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    if let Some(existing) = find_conflict(slot, &booked) {
        tracing::info!(%date, %slot, conflicting_id = %existing, "Slot already booked");
        return Err(RepositoryError::SlotTaken);
    }
    Ok(())
}

async fn fetch_in(conn: &mut PgConnection, id: AppointmentId) -> Result<Appointment, RepositoryError> {
    sqlx::query_as::<_, AppointmentRow>(&format!("{SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn booked(id: i32, start: &str, end: &str, status: AppointmentStatus) -> BookedSlot {
        BookedSlot {
            id: AppointmentId::new(id),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            status,
        }
    }

    #[test]
    fn test_finds_overlapping_confirmed_slot() {
        let day = [booked(1, "10:00", "10:30", AppointmentStatus::Confirmed)];
        let b = TimeSlot::parse("10:15", "10:45").unwrap();
        let c = TimeSlot::parse("10:30", "11:00").unwrap();
        assert_eq!(find_conflict(&b, &day), Some(AppointmentId::new(1)));
        assert_eq!(find_conflict(&c, &day), None);
    }

    #[test]
    fn test_ignores_non_blocking_statuses() {
        let day = [
            booked(1, "10:00", "11:00", AppointmentStatus::Cancelled),
            booked(2, "10:00", "11:00", AppointmentStatus::Completed),
        ];
        let slot = TimeSlot::parse("10:15", "10:45").unwrap();
        assert_eq!(find_conflict(&slot, &day), None);
    }

    #[test]
    fn test_reports_first_conflict() {
        let day = [
            booked(1, "09:00", "09:30", AppointmentStatus::Pending),
            booked(2, "12:00", "13:00", AppointmentStatus::Pending),
            booked(3, "12:30", "14:00", AppointmentStatus::Confirmed),
        ];
        let slot = TimeSlot::parse("11:00", "12:45").unwrap();
        assert_eq!(find_conflict(&slot, &day), Some(AppointmentId::new(2)));
    }
}
