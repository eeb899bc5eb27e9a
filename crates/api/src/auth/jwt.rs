//! Session token generation and validation.
//!
//! Sessions are HS256-signed JWTs carrying a [`Claims`] payload. Citizen
//! sessions are anonymous: their subject is a random UUID minted at login.
//! The admin subject is the configured admin email.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// A citizen's anonymous UUID, or the admin's email.
    pub sub: String,
    /// `"citizen"` or `"admin"`.
    pub role: String,
    /// Unix seconds after which the session is refused.
    pub exp: i64,
    /// Unix seconds at which the session was minted.
    pub iat: i64,
    /// Per-session UUID, logged so one session can be traced across requests.
    pub jti: String,
}

/// Signing secret and session lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 key.
    pub secret: String,
    /// How long a session stays valid, in minutes.
    pub access_token_expiry_mins: i64,
}

/// Sessions last twelve hours unless configured otherwise.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 720;

impl JwtConfig {
    /// Read `JWT_SECRET` (mandatory, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (optional, twelve hours when unset).
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or an expiry that is not an integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Mint a signed session for `subject` acting as `role`.
pub fn generate_access_token(
    subject: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check a session's signature and expiry and hand back its [`Claims`].
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
