//! Admin user management commands.
//!
//! There is no sign-up endpoint, so the first account is created here.
//!
//! ```bash
//! atelier admin create -e owner@atelier.test -n "Salon Owner" -p 'long-password' -r super_admin
//! atelier admin set-password -e owner@atelier.test -p 'new-long-password'
//! ```

use atelier_api::db::{self, RepositoryError};
use atelier_api::services::{AdminAccounts, AuthError};
use atelier_core::{AdminRole, Email};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: API_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// No admin with this email.
    #[error("No admin user with email: {0}")]
    UnknownUser(String),

    /// Password rules or storage failed.
    #[error(transparent)]
    Auth(AuthError),
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email).map_err(|e| AdminError::InvalidEmail(format!("{email} ({e})")))
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the role or email is invalid, the password is too
/// short, or the email is already registered.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> Result<(), AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = parse_email(email)?;

    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let admin = AdminAccounts::new(&pool)
        .create_admin(&email, name.trim(), role, password)
        .await
        .map_err(|e| match e {
            AuthError::Repository(RepositoryError::Conflict(_)) => {
                AdminError::UserExists(email.to_string())
            }
            other => AdminError::Auth(other),
        })?;

    tracing::info!(id = %admin.id, "Admin user created");
    Ok(())
}

/// Replace the password of an existing admin.
///
/// # Errors
///
/// Returns an error if the email is invalid or unknown, or the password is
/// too short.
pub async fn set_password(email: &str, password: &str) -> Result<(), AdminError> {
    let email = parse_email(email)?;

    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;

    AdminAccounts::new(&pool)
        .set_password(&email, password)
        .await
        .map_err(|e| match e {
            AuthError::Repository(RepositoryError::NotFound) => {
                AdminError::UnknownUser(email.to_string())
            }
            other => AdminError::Auth(other),
        })?;

    tracing::info!(%email, "Password updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_unknown_role() {
        let result = create_user("owner@atelier.test", "Owner", "password123", "viewer").await;
        assert!(matches!(result, Err(AdminError::InvalidRole(role)) if role == "viewer"));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let result = create_user("not-an-email", "Owner", "password123", "admin").await;
        assert!(matches!(result, Err(AdminError::InvalidEmail(_))));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AdminError::UserExists("a@b.co".into()).to_string(),
            "Admin user already exists with email: a@b.co"
        );
    }
}
