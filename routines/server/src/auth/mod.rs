use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::LazyLock;

use crate::config::Config;

pub mod api;

/// Lifetime of a token when the caller does not ask for one.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;
/// Lifetime of tokens handed out by the login endpoint.
pub const LOGIN_TOKEN_TTL_MINUTES: i64 = 20;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub id: i32,
}

impl CurrentUser {
    /// Creates a new CurrentUser instance.
    pub fn new(username: String, id: i32) -> Self {
        Self { username, id }
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.id)
    }
}

/// Authentication state containing the JWT signing secret.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
}

impl AuthState {
    /// Creates a new AuthState from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct Claims {
    pub sub: String, // Username of the authenticated user
    pub id: i32,     // Database ID of the authenticated user
    pub exp: usize,  // Expiry time of the token
}

/// Custom error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token or password could not be validated. Carries no detail on purpose.
    #[error("Could not validate credentials")]
    InvalidCredentials,
    /// Represents a failure of the password hashing backend.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    /// Represents an error while signing a JWT.
    /// The specific `jsonwebtoken::errors::Error` is captured as the source of this error.
    #[error("JWT operation failed")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Hashes a plaintext password into an Argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC string.
/// A stored value that does not parse never verifies.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed_password) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when no account matches, so a miss costs the same as a wrong password.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Checks a password against the stored hash of a user that may not exist.
/// Without a stored hash the password is still run through Argon2 and the result is `false`.
pub fn verify_password_or_dummy(password: &str, hashed_password: Option<&str>) -> bool {
    match hashed_password {
        Some(hashed_password) => verify_password(password, hashed_password),
        None => {
            if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            false
        }
    }
}

/// Signs a token for `username`/`user_id` that expires after `expires_in`,
/// or after [`DEFAULT_TOKEN_TTL_MINUTES`] when no lifetime is given.
pub fn encode_jwt(
    username: &str,
    user_id: i32,
    expires_in: Option<chrono::Duration>,
    jwt_secret: &str,
) -> Result<String, AuthError> {
    let expire = expires_in.unwrap_or_else(|| chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
    let exp = (chrono::Utc::now() + expire).timestamp().max(0) as usize;
    let claims = Claims {
        sub: username.to_string(),
        id: user_id,
        exp,
    };
    let jwt = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;
    Ok(jwt)
}

/// Verifies the signature and expiry of a token and returns its claims.
/// A token is rejected as soon as `exp` has passed.
pub fn decode_jwt(token: &str, jwt_secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AuthError::InvalidCredentials
    })?;
    Ok(token_data.claims)
}
