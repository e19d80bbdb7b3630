//! `/api/auth` handlers.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::AdminUserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::AdminUser;
use crate::response::{ApiResponse, ApiResult};
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminUser,
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let (token, admin) = AuthService::new(state.pool(), state.tokens())
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login rejected"))?;

    set_sentry_user(admin.id.as_i32(), admin.email.as_str());
    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(ApiResponse::json(LoginResponse { token, admin }))
}

/// The admin behind the presented token, as currently stored.
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>, RequireAdmin(current): RequireAdmin) -> ApiResult<AdminUser> {
    let admin = AdminUserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, account no longer exists".to_owned()))?;
    Ok(ApiResponse::json(admin))
}
