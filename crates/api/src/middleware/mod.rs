//! HTTP middleware and extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAdmin;
pub use rate_limit::auth_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
