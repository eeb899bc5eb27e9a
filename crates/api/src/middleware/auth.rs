//! JWT-based session extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jalsuraksha_core::error::CoreError;
use jalsuraksha_core::roles::{is_known_role, ROLE_ADMIN};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Session extracted from a JWT Bearer token in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Session subject (`claims.sub`).
    pub subject: String,
    /// Session role (`"admin"` or `"citizen"`).
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing Authorization header".into()))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if !is_known_role(&claims.role) {
            return Err(AppError::Core(CoreError::Unauthorized("Unknown session role".into())));
        }

        Ok(AuthUser {
            subject: claims.sub,
            role: claims.role,
        })
    }
}
