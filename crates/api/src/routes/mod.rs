pub mod alerts;
pub mod assessments;
pub mod auth;
pub mod health;
pub mod reports;
pub mod wards;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/me                             current session
///
/// /assessments                         assess one photo (POST, any session)
///
/// /reports                             submit (POST, any session), list (admin)
/// /reports/mine                        caller's own reports
/// /reports/{id}                        get (admin or owner)
/// /reports/{id}/review                 approve / reject (admin)
/// /reports/{id}/manual-score           score a failed assessment (admin)
///
/// /wards                               status of every ward (public)
/// /wards/{name}                        status of one ward (public)
///
/// /alerts                              recent shutdown alerts (public)
/// /alerts/{id}/acknowledge             acknowledge (admin)
///
/// /summary                             public dashboard summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/assessments", assessments::router())
        .nest("/reports", reports::router())
        .nest("/wards", wards::router())
        .nest("/alerts", alerts::router())
        .route("/summary", get(handlers::dashboard::summary))
}
