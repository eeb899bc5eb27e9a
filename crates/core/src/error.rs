use serde::{Deserialize, Serialize};

/// Domain-level errors shared by the store and the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure taxonomy of the cleanliness assessment pipeline.
///
/// Every failure is surfaced to the caller as one of these variants. None of
/// them is ever replaced by a fabricated result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    /// The photo could not be accepted (empty, oversized, unsupported format,
    /// undecodable header, malformed data URI).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Ward or description failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backend did not answer within the configured bound.
    #[error("Assessment timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The backend answered, but the answer does not satisfy the result schema.
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// The backend could not be reached or is misconfigured.
    ///
    /// `transient` is set for network failures and 5xx answers, which are
    /// eligible for a single retry. Missing credentials are not transient.
    #[error("Assessment backend unavailable: {reason}")]
    BackendUnavailable { reason: String, transient: bool },

    /// The in-flight limit was reached; the request was not admitted.
    #[error("Too many assessments in flight (limit {limit})")]
    Backpressure { limit: usize },
}

/// Stable, serializable tag for an [`AssessmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentErrorKind {
    EncodingError,
    InvalidRequest,
    Timeout,
    SchemaValidationError,
    BackendUnavailable,
    Backpressure,
}

impl AssessmentErrorKind {
    /// The wire name used in JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EncodingError => "encoding_error",
            Self::InvalidRequest => "invalid_request",
            Self::Timeout => "timeout",
            Self::SchemaValidationError => "schema_validation_error",
            Self::BackendUnavailable => "backend_unavailable",
            Self::Backpressure => "backpressure",
        }
    }

    /// Parse the wire name produced by [`AssessmentErrorKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::EncodingError,
            Self::InvalidRequest,
            Self::Timeout,
            Self::SchemaValidationError,
            Self::BackendUnavailable,
            Self::Backpressure,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == value)
    }

    /// Whether the submitting citizen can fix the problem themselves.
    pub fn is_user_correctable(self) -> bool {
        matches!(self, Self::EncodingError | Self::InvalidRequest)
    }
}

impl AssessmentError {
    pub fn kind(&self) -> AssessmentErrorKind {
        match self {
            Self::Encoding(_) => AssessmentErrorKind::EncodingError,
            Self::InvalidRequest(_) => AssessmentErrorKind::InvalidRequest,
            Self::Timeout { .. } => AssessmentErrorKind::Timeout,
            Self::SchemaValidation(_) => AssessmentErrorKind::SchemaValidationError,
            Self::BackendUnavailable { .. } => AssessmentErrorKind::BackendUnavailable,
            Self::Backpressure { .. } => AssessmentErrorKind::Backpressure,
        }
    }

    /// Timeouts and transient backend failures may be retried once.
    /// Schema failures are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::BackendUnavailable { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Shorthand for a non-transient [`AssessmentError::BackendUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
            transient: false,
        }
    }

    /// Shorthand for a transient [`AssessmentError::BackendUnavailable`].
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
            transient: true,
        }
    }
}
