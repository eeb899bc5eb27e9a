//! Shared query parameter types for API handlers.
//!
//! Ranges are checked with `validator`; defaults are applied in the handlers.

use jalsuraksha_core::error::CoreError;
use jalsuraksha_core::report::ReviewStatus;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// Default page size for the admin report queue.
pub const DEFAULT_REPORT_LIMIT: usize = 50;

/// Query parameters for `GET /reports`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportListParams {
    pub ward: Option<String>,
    pub review_status: Option<ReviewStatus>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize, Validate)]
pub struct AlertListParams {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// Run `validator` checks, mapping failures to a 400 validation error.
pub fn validated<T: Validate>(params: T) -> Result<T, AppError> {
    params
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    Ok(params)
}
