//! Admin authentication: Argon2 password hashes and HS256 bearer tokens.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use atelier_core::{AdminRole, AdminUserId, Email};

use crate::config::JwtConfig;
use crate::db::AdminUserRepository;
use crate::models::{AdminUser, CurrentAdmin};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id hash with the default cost that matches no password. Verified
/// when the email is unknown so the miss costs as much as a wrong password.
const MISS_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$G4oQWS+qibnFjwH5cvwlkQ$G9067/Yjl5Bl0Us97U+4BUpfa+JZV7z7F2qk2Y+WewY";

/// JWT claims carried by admin tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id.
    pub sub: i32,
    pub email: String,
    pub role: AdminRole,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl From<Claims> for CurrentAdmin {
    fn from(claims: Claims) -> Self {
        Self {
            id: AdminUserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Signs and verifies admin bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Build the HS256 keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    /// Issue a token for `admin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn issue(&self, admin: &AdminUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.as_i32(),
            email: admin.email.to_string(),
            role: admin.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, forged or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

/// Authentication service.
///
/// Checks admin credentials and issues bearer tokens.
pub struct AuthService<'a> {
    admins: AdminUserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            admins: AdminUserRepository::new(pool),
            tokens,
        }
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown emails, malformed emails and wrong passwords are
    /// indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, AdminUser), AuthError> {
        let found = match Email::parse(email) {
            Ok(email) => self.admins.get_with_password_hash(&email).await?,
            Err(_) => None,
        };
        let Some((admin, password_hash)) = found else {
            let _ = verify_password(password, MISS_PASSWORD_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(&admin)?;
        Ok((token, admin))
    }
}

/// Admin account management used by the CLI.
pub struct AdminAccounts<'a> {
    admins: AdminUserRepository<'a>,
}

impl<'a> AdminAccounts<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Create an admin account with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short, or
    /// `AuthError::Repository` if the email is taken.
    pub async fn create_admin(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        Ok(self.admins.create(email, name, role, &password_hash).await?)
    }

    /// Replace an admin's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short, or
    /// `AuthError::Repository` if no admin has this email.
    pub async fn set_password(&self, email: &Email, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        Ok(self.admins.set_password(email, &password_hash).await?)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn tokens(ttl_hours: i64) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: SecretString::from("k3P9xQ2mZ7vL4wR8tY1nB6cH5jF0dS3a".to_owned()),
            ttl_hours,
        })
    }

    fn admin() -> AdminUser {
        AdminUser {
            id: AdminUserId::new(7),
            email: Email::parse("owner@atelier.test").unwrap(),
            name: "Owner".into(),
            role: AdminRole::SuperAdmin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_miss_hash_costs_a_real_verification() {
        let parsed = PasswordHash::new(MISS_PASSWORD_HASH).unwrap();
        assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());

        let cost = argon2::Params::try_from(&parsed).unwrap();
        let defaults = Argon2::default();
        assert_eq!(cost.m_cost(), defaults.params().m_cost());
        assert_eq!(cost.t_cost(), defaults.params().t_cost());
        assert_eq!(cost.p_cost(), defaults.params().p_cost());

        for guess in ["", "password", "correct horse"] {
            assert!(matches!(
                verify_password(guess, MISS_PASSWORD_HASH),
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(validate_password("short"), Err(AuthError::WeakPassword(_))));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_token_carries_admin() {
        let service = tokens(24);
        let token = service.issue(&admin()).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, AdminRole::SuperAdmin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);

        let current = CurrentAdmin::from(claims);
        assert_eq!(current.role, AdminRole::SuperAdmin);
        assert_eq!(current.email, "owner@atelier.test");
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = tokens(-1);
        let token = service.issue(&admin()).unwrap();
        assert!(matches!(service.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = tokens(24).issue(&admin()).unwrap();
        let other = TokenService::new(&JwtConfig {
            secret: SecretString::from("Zq8Wm2Lp5Rt9Xv3Nb7Hc1Jd4Kf6Gs0Ya".to_owned()),
            ttl_hours: 24,
        });
        assert!(other.verify(&token).is_err());
        assert!(other.verify("not.a.jwt").is_err());
    }
}
