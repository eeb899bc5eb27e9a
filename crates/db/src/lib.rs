//! Postgres persistence for citizen reports and shutdown alerts.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool` as
//! their first argument and return `sqlx::Error` on failure. Domain outcomes
//! such as "already decided" are expressed as `Ok(None)` and interpreted by
//! the caller.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Shared database handle.
pub type DbPool = PgPool;

/// Connect to Postgres.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
