use std::sync::Arc;

use jalsuraksha_genai::Assessor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool for reports and alerts.
    pub pool: jalsuraksha_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Assessment front door (backend, timeout, retry, admission control).
    pub assessor: Arc<Assessor>,
}
