//! Integration tests for appointment booking and the slot overlap check.
//!
//! Requires a running API server and `PostgreSQL`; see the crate docs.

use atelier_integration_tests::{TestContext, unique_date, unique_phone, unique_suffix};
use reqwest::StatusCode;
use serde_json::json;

/// Service and client every appointment in a test points at.
struct Fixture {
    service_id: i64,
    client_id: i64,
}

impl Fixture {
    async fn create(ctx: &TestContext) -> Self {
        let suffix = unique_suffix();
        let service_id = ctx
            .create(
                "/api/services",
                json!({ "title": format!("Test manicure {suffix}") }),
            )
            .await;
        let client_id = ctx
            .create(
                "/api/clients",
                json!({ "name": format!("Test client {suffix}"), "phone": unique_phone() }),
            )
            .await;
        Self {
            service_id,
            client_id,
        }
    }

    fn appointment(&self, date: &str, start: &str, end: &str, status: &str) -> serde_json::Value {
        json!({
            "clientId": self.client_id,
            "serviceId": self.service_id,
            "date": date,
            "startTime": start,
            "endTime": end,
            "status": status,
        })
    }

    async fn cleanup(self, ctx: &TestContext, appointments: &[i64]) {
        for id in appointments {
            let _ = ctx.delete(&format!("/api/appointments/{id}")).await;
        }
        let _ = ctx.delete(&format!("/api/clients/{}", self.client_id)).await;
        let _ = ctx.delete(&format!("/api/services/{}", self.service_id)).await;
    }
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_overlapping_slot_rejected_adjacent_accepted() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;
    let date = unique_date();

    // A: 10:00-10:30, confirmed
    let a = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "10:00", "10:30", "confirmed"),
        )
        .await;

    // B: 10:15-10:45 overlaps A
    let (status, body) = ctx
        .post(
            "/api/appointments",
            fixture.appointment(&date, "10:15", "10:45", "pending"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Time slot already booked");

    // C: 10:30-11:00 starts exactly when A ends
    let c = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "10:30", "11:00", "pending"),
        )
        .await;

    let (status, slots) = ctx
        .get(&format!("/api/appointments/availability?date={date}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = slots["data"]
        .as_array()
        .map(|slots| slots.iter().filter_map(|s| s["startTime"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(starts, ["10:00", "10:30"]);

    fixture.cleanup(&ctx, &[a, c]).await;
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cancelled_appointment_frees_slot() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;
    let date = unique_date();

    let cancelled = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "14:00", "15:00", "cancelled"),
        )
        .await;
    let booked = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "14:00", "15:00", "pending"),
        )
        .await;

    // Re-activating the cancelled one now collides with the new booking.
    let (status, body) = ctx
        .put(
            &format!("/api/appointments/{cancelled}"),
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Time slot already booked");

    fixture.cleanup(&ctx, &[cancelled, booked]).await;
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_simultaneous_bookings_for_one_slot() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;
    let date = unique_date();
    let slot = fixture.appointment(&date, "16:00", "17:00", "pending");

    let (first, second) = tokio::join!(
        ctx.post("/api/appointments", slot.clone()),
        ctx.post("/api/appointments", slot),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let (booked, rejected) = if first.0 == StatusCode::OK {
        (first.1, second.1)
    } else {
        (second.1, first.1)
    };
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["message"], "Time slot already booked");

    let id = booked["data"]["id"].as_i64().expect("booking has an id");
    fixture.cleanup(&ctx, &[id]).await;
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_moving_onto_booked_slot_rejected() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;
    let date = unique_date();

    let morning = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "10:00", "11:00", "confirmed"),
        )
        .await;
    let noon = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&date, "12:00", "13:00", "pending"),
        )
        .await;

    let (status, body) = ctx
        .put(
            &format!("/api/appointments/{noon}"),
            json!({ "startTime": "10:30", "endTime": "11:30" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Time slot already booked");

    // Unchanged after the rejected move; a move to a free slot still works.
    let (_, current) = ctx.get(&format!("/api/appointments/{noon}")).await;
    assert_eq!(current["data"]["startTime"], "12:00");
    let (status, moved) = ctx
        .put(
            &format!("/api/appointments/{noon}"),
            json!({ "startTime": "11:00", "endTime": "12:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["data"]["startTime"], "11:00");

    fixture.cleanup(&ctx, &[morning, noon]).await;
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_inverted_slot_rejected() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;

    let (status, body) = ctx
        .post(
            "/api/appointments",
            fixture.appointment(&unique_date(), "12:00", "11:00", "pending"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "endTime must be after startTime");

    fixture.cleanup(&ctx, &[]).await;
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_booked_service_cannot_be_deleted() {
    let ctx = TestContext::admin().await;
    let fixture = Fixture::create(&ctx).await;

    let id = ctx
        .create(
            "/api/appointments",
            fixture.appointment(&unique_date(), "09:00", "09:45", "confirmed"),
        )
        .await;

    let (status, _) = ctx
        .delete(&format!("/api/services/{}", fixture.service_id))
        .await;
    assert!(status.is_client_error(), "unexpected status {status}");

    fixture.cleanup(&ctx, &[id]).await;
}
