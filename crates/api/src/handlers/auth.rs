//! Handlers for the `/auth` resource (login, current session).

use axum::extract::State;
use axum::Json;
use jalsuraksha_core::error::CoreError;
use jalsuraksha_core::roles::{ROLE_ADMIN, ROLE_CITIZEN};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::validated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
///
/// Citizens log in anonymously with only `role`. Admins also send
/// `email` and `password`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub role: String,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub session: SessionInfo,
}

/// The caller's session as seen by the server.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub subject: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let input = validated(input)?;

    let subject = match input.role.as_str() {
        ROLE_CITIZEN => Uuid::new_v4().to_string(),
        ROLE_ADMIN => authenticate_admin(&state, &input)?,
        other => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role '{other}'. Expected 'citizen' or 'admin'"
            ))))
        }
    };

    let access_token = generate_access_token(&subject, &input.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(role = %input.role, "Session issued");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        session: SessionInfo {
            subject,
            role: input.role,
        },
    }))
}

/// GET /api/v1/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<SessionInfo> {
    Json(SessionInfo {
        subject: user.subject,
        role: user.role,
    })
}

/// Check admin credentials against the configured account and return the
/// session subject.
fn authenticate_admin(state: &AppState, input: &LoginRequest) -> AppResult<String> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let (Some(email), Some(password)) = (input.email.as_deref(), input.password.as_deref()) else {
        return Err(AppError::Core(CoreError::Validation(
            "Admin login requires email and password".into(),
        )));
    };

    let account = &state.config.admin;
    let Some(hash) = account.password_hash.as_deref() else {
        tracing::warn!("Admin login attempted but ADMIN_PASSWORD_HASH is not configured");
        return Err(invalid());
    };

    if !email.trim().eq_ignore_ascii_case(&account.email) {
        return Err(invalid());
    }

    let password_valid = verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!("Admin login failed");
        return Err(invalid());
    }

    Ok(account.email.clone())
}
