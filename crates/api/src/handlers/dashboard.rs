//! Handler for the public dashboard summary.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use jalsuraksha_core::alert::ALERT_WINDOW_HOURS;
use jalsuraksha_core::summary::{public_summary, PublicSummary};
use jalsuraksha_db::repositories::{AlertRepo, ReportRepo};

use crate::error::AppResult;
use crate::handlers::wards::ward_statuses;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/summary
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<DataResponse<PublicSummary>>> {
    let wards = ward_statuses(&state.pool).await?;
    let since = Utc::now() - Duration::hours(ALERT_WINDOW_HOURS);
    let active_alerts = AlertRepo::count_active(&state.pool, since).await?;
    let ai_scores = ReportRepo::ai_scores(&state.pool).await?;

    Ok(Json(DataResponse {
        data: public_summary(&wards, active_alerts as usize, &ai_scores),
    }))
}
