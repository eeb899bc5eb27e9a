//! Repository for the `shutdown_alerts` table.

use jalsuraksha_core::alert::pipeline_id;
use jalsuraksha_core::types::{DbId, Timestamp};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::alert::{CreateShutdownAlert, ShutdownAlert, ALERT_COLUMNS};

/// Provides CRUD operations for shutdown alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new unacknowledged alert with a mock pipeline id.
    ///
    /// A report raises at most one alert: returns `None` when `report_id`
    /// already has one.
    pub async fn create(
        pool: &PgPool,
        input: &CreateShutdownAlert,
    ) -> Result<Option<ShutdownAlert>, sqlx::Error> {
        let query = format!(
            "INSERT INTO shutdown_alerts (ward, pipeline_id, reason, severity, report_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (report_id) WHERE report_id IS NOT NULL DO NOTHING
             RETURNING {ALERT_COLUMNS}"
        );
        let alert = sqlx::query_as::<_, ShutdownAlert>(&query)
            .bind(&input.ward)
            .bind(pipeline_id(Uuid::new_v4().as_u128() as u16))
            .bind(&input.reason)
            .bind(input.severity.as_str())
            .bind(input.report_id)
            .fetch_optional(pool)
            .await?;

        if let Some(alert) = &alert {
            tracing::info!(
                alert_id = alert.id,
                ward = %alert.ward,
                pipeline_id = %alert.pipeline_id,
                "Shutdown alert raised"
            );
        }
        Ok(alert)
    }

    /// Alerts created at or after `since`, newest first, at most `limit`.
    pub async fn list_recent(
        pool: &PgPool,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<ShutdownAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {ALERT_COLUMNS} FROM shutdown_alerts
             WHERE created_at >= $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ShutdownAlert>(&query)
            .bind(since)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of unacknowledged alerts created at or after `since`.
    pub async fn count_active(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shutdown_alerts
             WHERE acknowledged_at IS NULL AND created_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Mark an alert as acknowledged. Acknowledging twice keeps the first
    /// acknowledgement. Returns `None` for unknown ids.
    pub async fn acknowledge(
        pool: &PgPool,
        id: DbId,
        by: &str,
    ) -> Result<Option<ShutdownAlert>, sqlx::Error> {
        let query = format!(
            "UPDATE shutdown_alerts
             SET acknowledged_by = COALESCE(acknowledged_by, $2),
                 acknowledged_at = COALESCE(acknowledged_at, NOW()),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ALERT_COLUMNS}"
        );
        sqlx::query_as::<_, ShutdownAlert>(&query)
            .bind(id)
            .bind(by)
            .fetch_optional(pool)
            .await
    }
}
