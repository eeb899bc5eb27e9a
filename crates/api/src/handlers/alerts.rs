//! Handlers for the `/alerts` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use jalsuraksha_core::alert::{clamp_limit, ALERT_WINDOW_HOURS};
use jalsuraksha_core::error::CoreError;
use jalsuraksha_core::types::DbId;
use jalsuraksha_db::models::alert::ShutdownAlert;
use jalsuraksha_db::repositories::AlertRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::{validated, AlertListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts
///
/// Alerts raised within the alert window, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Vec<ShutdownAlert>>>> {
    let params = validated(params)?;
    let since = Utc::now() - Duration::hours(ALERT_WINDOW_HOURS);
    let alerts = AlertRepo::list_recent(&state.pool, since, clamp_limit(params.limit) as i64).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// POST /api/v1/alerts/{id}/acknowledge
pub async fn acknowledge(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ShutdownAlert>>> {
    let alert = AlertRepo::acknowledge(&state.pool, id, &admin.subject)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Alert",
                id: id.to_string(),
            })
        })?;
    tracing::info!(alert_id = id, "Shutdown alert acknowledged");
    Ok(Json(DataResponse { data: alert }))
}
