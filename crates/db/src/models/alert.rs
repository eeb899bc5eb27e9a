//! Shutdown alert rows and DTOs.

use jalsuraksha_core::alert::AlertSeverity;
use jalsuraksha_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::report::decode_error;

/// Column list for `shutdown_alerts` queries.
pub const ALERT_COLUMNS: &str = "id, ward, pipeline_id, reason, severity, report_id, \
    acknowledged_at IS NOT NULL AS acknowledged, acknowledged_by, acknowledged_at, created_at";

/// A shutdown alert raised for a ward.
#[derive(Debug, Clone, Serialize)]
pub struct ShutdownAlert {
    pub id: DbId,
    pub ward: String,
    pub pipeline_id: String,
    pub reason: String,
    pub severity: AlertSeverity,
    /// The report that triggered the alert.
    pub report_id: Option<DbId>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for ShutdownAlert {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let severity: String = row.try_get("severity")?;
        Ok(Self {
            id: row.try_get("id")?,
            ward: row.try_get("ward")?,
            pipeline_id: row.try_get("pipeline_id")?,
            reason: row.try_get("reason")?,
            severity: AlertSeverity::parse(&severity)
                .ok_or_else(|| decode_error("severity", &severity))?,
            report_id: row.try_get("report_id")?,
            acknowledged: row.try_get("acknowledged")?,
            acknowledged_by: row.try_get("acknowledged_by")?,
            acknowledged_at: row.try_get("acknowledged_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// DTO for creating an alert.
#[derive(Debug, Clone)]
pub struct CreateShutdownAlert {
    pub ward: String,
    pub reason: String,
    pub severity: AlertSeverity,
    pub report_id: Option<DbId>,
}
