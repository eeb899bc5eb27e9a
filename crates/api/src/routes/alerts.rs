//! Route definitions for the `/alerts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET  /                     -> list
/// POST /{id}/acknowledge     -> acknowledge (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list))
        .route("/{id}/acknowledge", post(alerts::acknowledge))
}
