use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jalsuraksha_core::error::{AssessmentError, AssessmentErrorKind, CoreError};
use serde_json::json;

/// Message shown to citizens for failures they cannot fix themselves.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Submission failed, please try again";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, [`AssessmentError`] for pipeline
/// failures and `sqlx::Error` for storage failures, and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jalsuraksha_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A tagged assessment failure, reported with its specific kind.
    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    /// A Postgres failure from the report or alert store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An assessment failure reported to a citizen without its details.
    #[error("Submission failed ({})", .0.as_str())]
    SubmissionFailed(AssessmentErrorKind),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shape an assessment failure for its audience.
    ///
    /// Admins, and anyone facing a problem they can correct (bad photo, bad
    /// ward), get the specific kind. Citizens get a generic message for
    /// everything else, with the same HTTP status.
    pub fn for_audience(err: AssessmentError, is_admin: bool) -> Self {
        if is_admin || err.kind().is_user_correctable() {
            Self::Assessment(err)
        } else {
            Self::SubmissionFailed(err.kind())
        }
    }
}

/// HTTP status for each assessment failure kind.
pub fn assessment_status(kind: AssessmentErrorKind) -> StatusCode {
    match kind {
        AssessmentErrorKind::EncodingError | AssessmentErrorKind::InvalidRequest => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        AssessmentErrorKind::SchemaValidationError => StatusCode::BAD_GATEWAY,
        AssessmentErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        AssessmentErrorKind::Backpressure => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn assessment_code(kind: AssessmentErrorKind) -> &'static str {
    match kind {
        AssessmentErrorKind::EncodingError => "ENCODING_ERROR",
        AssessmentErrorKind::InvalidRequest => "INVALID_REQUEST",
        AssessmentErrorKind::Timeout => "ASSESSMENT_TIMEOUT",
        AssessmentErrorKind::SchemaValidationError => "SCHEMA_VALIDATION_ERROR",
        AssessmentErrorKind::BackendUnavailable => "BACKEND_UNAVAILABLE",
        AssessmentErrorKind::Backpressure => "BACKPRESSURE",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Assessment failures ---
            AppError::Assessment(err) => {
                let kind = err.kind();
                let body = json!({
                    "error": err.to_string(),
                    "code": assessment_code(kind),
                    "kind": kind.as_str(),
                });
                return (assessment_status(kind), axum::Json(body)).into_response();
            }
            AppError::SubmissionFailed(kind) => (
                assessment_status(*kind),
                "SUBMISSION_FAILED",
                SUBMISSION_FAILED_MESSAGE.to_string(),
            ),

            // --- Database errors ---
            AppError::Database(err) => classify_database_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a storage failure to a status, code and client-safe message.
///
/// A missing row is a 404 and a violated `uq_` index is a 409; anything else
/// is logged and hidden behind a 500.
fn classify_database_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }
    if let sqlx::Error::Database(db_err) = err {
        // 23505: unique_violation
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.code().as_deref() == Some("23505") && constraint.starts_with("uq_") {
            return (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Record already exists ({constraint})"),
            );
        }
    }
    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
