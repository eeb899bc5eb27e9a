//! Route definitions for the `/wards` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::wards;
use crate::state::AppState;

/// Routes mounted at `/wards`.
///
/// ```text
/// GET /          -> list
/// GET /{name}    -> get
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(wards::list))
        .route("/{name}", get(wards::get))
}
