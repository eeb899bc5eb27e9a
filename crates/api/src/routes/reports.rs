//! Route definitions for the `/reports` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// POST /                      -> submit
/// GET  /                      -> list (admin)
/// GET  /mine                  -> list_mine
/// GET  /summary               -> summary (admin)
/// GET  /{id}                  -> get
/// GET  /{id}/photo            -> photo
/// POST /{id}/review           -> review (admin)
/// POST /{id}/manual-score     -> manual_score (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reports::submit).get(reports::list))
        .route("/mine", get(reports::list_mine))
        .route("/summary", get(reports::summary))
        .route("/{id}", get(reports::get))
        .route("/{id}/photo", get(reports::photo))
        .route("/{id}/review", post(reports::review))
        .route("/{id}/manual-score", post(reports::manual_score))
}
