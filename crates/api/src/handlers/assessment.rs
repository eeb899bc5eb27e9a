//! Handler for the stateless assessment contract endpoint.

use axum::extract::State;
use axum::Json;
use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::encoding::PhotoPayload;
use jalsuraksha_core::error::AssessmentError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// Request body for `POST /assessments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessInput {
    pub photo_data_uri: String,
    pub ward: String,
    pub description: Option<String>,
}

/// Run a photo decode on the blocking pool. Decoding touches every pixel and
/// must not stall the async workers.
pub(crate) async fn decode_off_runtime<F>(decode: F) -> AppResult<Result<PhotoPayload, AssessmentError>>
where
    F: FnOnce() -> Result<PhotoPayload, AssessmentError> + Send + 'static,
{
    tokio::task::spawn_blocking(decode)
        .await
        .map_err(|e| AppError::InternalError(format!("Photo decode task failed: {e}")))
}

/// POST /api/v1/assessments
///
/// Assess one photo without storing anything. Answers with the bare result
/// object on success and a tagged failure otherwise.
pub async fn assess(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<AssessInput>,
) -> AppResult<Json<AssessmentResult>> {
    let is_admin = user.is_admin();

    let max_bytes = state.config.max_photo_bytes;
    let uri = input.photo_data_uri;
    let photo = decode_off_runtime(move || PhotoPayload::from_data_uri(&uri, max_bytes))
        .await?
        .map_err(|e| AppError::for_audience(e, is_admin))?;
    let request = AssessmentRequest::new(photo, &input.ward, input.description.as_deref())
        .map_err(|e| AppError::for_audience(e, is_admin))?;

    let result = state
        .assessor
        .assess(&request)
        .await
        .map_err(|e| AppError::for_audience(e, is_admin))?;

    Ok(Json(result))
}
