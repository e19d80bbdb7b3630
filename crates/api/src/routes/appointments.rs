//! `/api/appointments` handlers (admin only).
//!
//! Create and update go through the repository's transactional overlap
//! check; a collision surfaces as `400 "Time slot already booked"`.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use atelier_core::AppointmentId;

use crate::db::AppointmentRepository;
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::appointment::parse_date;
use crate::models::{Appointment, AppointmentFilter, AppointmentInput, BookedSlot};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;

const RESOURCE: &str = "Appointment";

#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(filter): ApiQuery<AppointmentFilter>,
) -> ApiResult<Vec<Appointment>> {
    let appointments = AppointmentRepository::new(state.pool()).list(&filter).await?;
    Ok(ApiResponse::list(appointments))
}

/// Slots already held on a day, for picking a free time in the console.
#[instrument(skip(state))]
pub async fn availability(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> ApiResult<Vec<BookedSlot>> {
    let raw = query
        .date
        .ok_or_else(|| AppError::BadRequest("date is required".to_owned()))?;
    let date = parse_date(&raw)?;
    let slots = AppointmentRepository::new(state.pool()).booked_slots(date).await?;
    Ok(ApiResponse::list(slots))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<AppointmentId>,
) -> ApiResult<Appointment> {
    let appointment = AppointmentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(RESOURCE))?;
    Ok(ApiResponse::json(appointment))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<AppointmentInput>,
) -> ApiResult<Appointment> {
    let draft = input.into_draft()?;
    let appointment = AppointmentRepository::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(appointment))
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<AppointmentId>,
    ApiJson(input): ApiJson<AppointmentInput>,
) -> ApiResult<Appointment> {
    let repo = AppointmentRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(RESOURCE))?;
    let draft = input.merge(&current).into_draft()?;
    let appointment = repo.update(id, &draft).await.for_resource(RESOURCE)?;
    Ok(ApiResponse::json(appointment))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<AppointmentId>,
) -> ApiResult<Empty> {
    AppointmentRepository::new(state.pool())
        .delete(id)
        .await
        .for_resource(RESOURCE)?;
    Ok(ApiResponse::json(Empty {}))
}
