//! Atelier API library.
//!
//! REST backend for the salon site and the admin console: content CRUD,
//! clients and appointments, the product catalog, media uploads and admin
//! authentication. Exposed as a library so the router can be tested and
//! reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// CORS policy allowing the configured origins to call the API with a
/// bearer token.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the full application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let cors = cors_layer(&config.cors_origins);
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .merge(routes::routes(config))
        .nest_service(services::uploads::PUBLIC_PREFIX, uploads)
        .layer(body_limit)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{HeaderName, Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use atelier_core::{AdminRole, AdminUserId, Email};

    use crate::config::{ApiConfig, JwtConfig};
    use crate::models::AdminUser;

    /// State whose pool never connects; every request below is answered
    /// before the database is touched.
    fn test_state() -> AppState {
        state_with_ip_header(None)
    }

    fn state_with_ip_header(client_ip_header: Option<HeaderName>) -> AppState {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/atelier_test".to_owned()),
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            jwt: JwtConfig {
                secret: SecretString::from("k3P9xQ2mZ7vL4wR8tY1nB6cH5jF0dS3a".to_owned()),
                ttl_hours: 24,
            },
            cors_origins: vec!["http://localhost:3000".to_owned()],
            upload_dir: std::env::temp_dir().join("atelier-router-tests"),
            max_upload_bytes: 1024,
            client_ip_header,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/atelier_test")
            .unwrap();
        AppState::new(config, pool)
    }

    /// Attach the socket address `axum::serve` would record for the peer.
    fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    /// Login attempts from one router, each naming a different client in
    /// the usual proxy headers. The body is incomplete so no attempt
    /// reaches the database.
    async fn login_statuses(router: &Router, attempts: u8, peer: &str) -> Vec<StatusCode> {
        let mut statuses = Vec::new();
        for i in 0..attempts {
            let mut request = json_request("POST", "/api/auth/login", None, "{}");
            let spoofed = format!("203.0.113.{i}");
            for name in ["x-real-ip", "x-forwarded-for", "cf-connecting-ip"] {
                request.headers_mut().insert(name, spoofed.parse().unwrap());
            }
            let response = router
                .clone()
                .oneshot(from_peer(request, peer))
                .await
                .unwrap();
            statuses.push(response.status());
        }
        statuses
    }

    fn bearer(state: &AppState) -> String {
        let admin = AdminUser {
            id: AdminUserId::new(1),
            email: Email::parse("owner@atelier.test").unwrap(),
            name: "Owner".into(),
            role: AdminRole::SuperAdmin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        format!("Bearer {}", state.tokens().issue(&admin).unwrap())
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app(test_state())
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_writes_require_token() {
        let (status, body) = send(
            test_state(),
            json_request("POST", "/api/services", None, r#"{"title":"Manicure"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authorized, no token");
    }

    #[tokio::test]
    async fn test_crm_reads_require_token() {
        let (status, _) = send(
            test_state(),
            Request::get("/api/clients").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_rejected() {
        let (status, body) = send(
            test_state(),
            json_request("DELETE", "/api/appointments/1", Some("Bearer not.a.token"), ""),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized, token failed");
    }

    #[tokio::test]
    async fn test_appointment_with_inverted_slot_rejected() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request(
                "POST",
                "/api/appointments",
                Some(&auth),
                r#"{"clientId":1,"serviceId":1,"date":"2025-01-10","startTime":"11:00","endTime":"10:00"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "endTime must be after startTime");
    }

    #[tokio::test]
    async fn test_appointment_with_unpadded_time_rejected() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request(
                "POST",
                "/api/appointments",
                Some(&auth),
                r#"{"clientId":1,"serviceId":1,"date":"2025-01-10","startTime":"9:00","endTime":"10:00"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_availability_requires_date() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request("GET", "/api/appointments/availability", Some(&auth), ""),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "date is required");
    }

    #[tokio::test]
    async fn test_malformed_json_is_enveloped() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request("POST", "/api/clients", Some(&auth), "{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_inverted_price_range_rejected() {
        let (status, body) = send(
            test_state(),
            Request::get("/api/products?minPrice=100&maxPrice=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "minPrice cannot exceed maxPrice");
    }

    #[tokio::test]
    async fn test_login_with_malformed_email_is_invalid_credentials() {
        let mut request = json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"email":"not-an-email","password":"whatever"}"#,
        );
        let (status, body) = send(test_state(), from_peer(request, "192.0.2.10:51000")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_limit_ignores_rotated_proxy_headers() {
        let router = app(test_state());
        let statuses = login_statuses(&router, 7, "192.0.2.20:51000").await;
        assert_eq!(
            statuses,
            [
                vec![StatusCode::BAD_REQUEST; 5],
                vec![StatusCode::TOO_MANY_REQUESTS; 2]
            ]
            .concat()
        );

        let other_peer = login_statuses(&router, 1, "192.0.2.21:51000").await;
        assert_eq!(other_peer, [StatusCode::BAD_REQUEST]);
    }

    #[tokio::test]
    async fn test_login_limit_rejection_is_enveloped() {
        let router = app(test_state());
        login_statuses(&router, 5, "192.0.2.30:51000").await;

        let request = json_request("POST", "/api/auth/login", None, "{}");
        let response = router
            .oneshot(from_peer(request, "192.0.2.30:51000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Too many attempts, please try again later");
    }

    #[tokio::test]
    async fn test_login_limit_keys_on_configured_header() {
        let state = state_with_ip_header(Some(HeaderName::from_static("x-real-ip")));
        let router = app(state);
        let statuses = login_statuses(&router, 7, "10.0.0.2:443").await;
        assert!(statuses.iter().all(|s| *s == StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extension() {
        let state = test_state();
        let auth = bearer(&state);
        let boundary = "atelier-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"run.exe\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nMZ\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/upload")
            .header("authorization", auth)
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "file type not allowed: exe");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body_is_enveloped() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request("POST", "/api/upload", Some(&auth), r#"{"image":"x"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("boundary"));
    }

    #[tokio::test]
    async fn test_upload_delete_rejects_traversal() {
        let state = test_state();
        let auth = bearer(&state);
        let (status, body) = send(
            state,
            json_request("DELETE", "/api/upload/..%2F.env", Some(&auth), ""),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid file name");
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/services")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }
}
