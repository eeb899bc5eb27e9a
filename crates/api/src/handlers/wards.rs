//! Handlers for the `/wards` resource.

use axum::extract::{Path, State};
use axum::Json;
use jalsuraksha_core::error::CoreError;
use jalsuraksha_core::summary::{aggregate_wards, WardStatus};
use jalsuraksha_core::ward::canonical_ward;
use jalsuraksha_db::repositories::ReportRepo;
use jalsuraksha_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Current status of every registered ward.
pub(crate) async fn ward_statuses(pool: &DbPool) -> AppResult<Vec<WardStatus>> {
    let scored = ReportRepo::scored_by_ward(pool).await?;
    let borrowed: Vec<(&str, _)> = scored.iter().map(|(w, s)| (w.as_str(), *s)).collect();
    Ok(aggregate_wards(&borrowed))
}

/// GET /api/v1/wards
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<WardStatus>>>> {
    Ok(Json(DataResponse {
        data: ward_statuses(&state.pool).await?,
    }))
}

/// GET /api/v1/wards/{name}
pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<WardStatus>>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Ward",
            id: name.clone(),
        })
    };
    let ward = canonical_ward(&name).ok_or_else(not_found)?;

    let status = ward_statuses(&state.pool)
        .await?
        .into_iter()
        .find(|w| w.ward == ward)
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse { data: status }))
}
