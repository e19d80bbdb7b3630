//! Integration tests for Atelier.
//!
//! These talk to real servers over HTTP, so every test is `#[ignore]`d and
//! needs:
//! - `PostgreSQL` with migrations applied (`atelier migrate`)
//! - an admin account (`atelier admin create ...`)
//! - the API (`cargo run -p atelier-api`) and, for page tests, the site
//!   (`cargo run -p atelier-site`)
//!
//! ```bash
//! ATELIER_TEST_EMAIL=owner@atelier.test ATELIER_TEST_PASSWORD=... \
//!     cargo test -p atelier-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! # Environment Variables
//!
//! - `ATELIER_API_URL` - API base URL (default: `http://localhost:4000`)
//! - `ATELIER_SITE_URL` - Site base URL (default: `http://localhost:3000`)
//! - `ATELIER_TEST_EMAIL`, `ATELIER_TEST_PASSWORD` - admin credentials
//! - `ATELIER_TEST_TOKEN` - pre-issued admin bearer token; skips the login
//!
//! Each test binary logs in at most once. The API allows five login attempts
//! per client before throttling, so per-test logins would lock the suite out.

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use tokio::sync::OnceCell;

/// Admin bearer token shared by every test in the binary.
static ADMIN_TOKEN: OnceCell<String> = OnceCell::const_new();

/// API base URL (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("ATELIER_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Site base URL (configurable via environment).
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("ATELIER_SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client plus an optional admin bearer token.
pub struct TestContext {
    pub client: Client,
    pub api_url: String,
    token: Option<String>,
}

impl TestContext {
    /// Anonymous context.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            api_url: api_base_url(),
            token: None,
        }
    }

    /// Context carrying the admin token, logging in on first use.
    pub async fn admin() -> Self {
        let mut ctx = Self::anonymous();
        let token = ADMIN_TOKEN.get_or_init(|| ctx.login()).await.clone();
        ctx.token = Some(token);
        ctx
    }

    /// `ATELIER_TEST_TOKEN`, or a fresh token for `ATELIER_TEST_EMAIL` /
    /// `ATELIER_TEST_PASSWORD`.
    async fn login(&self) -> String {
        if let Ok(token) = std::env::var("ATELIER_TEST_TOKEN") {
            return token;
        }
        let email = std::env::var("ATELIER_TEST_EMAIL").expect("ATELIER_TEST_EMAIL not set");
        let password =
            std::env::var("ATELIER_TEST_PASSWORD").expect("ATELIER_TEST_PASSWORD not set");

        let (status, body) = self
            .post("/api/auth/login", json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        body["data"]["token"]
            .as_str()
            .expect("login response has no token")
            .to_owned()
    }

    /// Send a request and return the status and JSON envelope.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = self.client.request(method, format!("{}{path}", self.api_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.expect("Failed to reach API");
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None).await
    }

    /// Create a record and return its id.
    pub async fn create(&self, path: &str, body: Value) -> i64 {
        let (status, created) = self.post(path, body).await;
        assert_eq!(status, StatusCode::OK, "create {path} failed: {created}");
        created["data"]["id"].as_i64().expect("created record has no id")
    }
}

/// A date far in the future that no other run is likely to use, as `YYYY-MM-DD`.
#[must_use]
pub fn unique_date() -> String {
    let offset = i64::try_from(uuid::Uuid::new_v4().as_u128() % 20_000).unwrap_or_default();
    let base = chrono::NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or_default();
    (base + chrono::Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

/// Suffix that keeps names and slugs unique across runs.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

/// A phone number no other run is likely to use: `+1 555` and ten random
/// digits.
#[must_use]
pub fn unique_phone() -> String {
    let digits = uuid::Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("+1 555 {digits:010}")
}
