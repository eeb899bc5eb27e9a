//! Route definitions for the `/assessments` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::assessment;
use crate::state::AppState;

/// Routes mounted at `/assessments`.
///
/// ```text
/// POST /    -> assess
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(assessment::assess))
}
