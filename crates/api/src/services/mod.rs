//! Business logic services.

pub mod auth;
pub mod uploads;

pub use auth::{AdminAccounts, AuthError, AuthService, Claims, TokenService};
pub use uploads::{StoredFile, UploadError, UploadStore};
