//! Shutdown alert rules.
//!
//! A report whose effective label is `Unsafe` raises one alert; scoring the
//! same report again never raises a second. Alerts are plain records: the
//! only state change is acknowledgement.

use serde::{Deserialize, Serialize};

use crate::status::StatusLabel;

/// Alerts older than this are no longer "recent" or "active".
pub const ALERT_WINDOW_HOURS: i64 = 24;

/// Default number of alerts returned by the recent-alerts listing.
pub const DEFAULT_ALERT_LIMIT: usize = 5;

/// Hard cap on the recent-alerts listing.
pub const MAX_ALERT_LIMIT: usize = 50;

/// Severity of a shutdown alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Decide whether a scored report warrants a shutdown alert.
///
/// Returns the severity and a human-readable reason, or `None`.
pub fn shutdown_alert_for(ward: &str, label: StatusLabel) -> Option<(AlertSeverity, String)> {
    match label {
        StatusLabel::Unsafe => Some((
            AlertSeverity::Critical,
            format!("High contamination reported by citizen in {ward}"),
        )),
        StatusLabel::Safe | StatusLabel::Moderate => None,
    }
}

/// Render a mock pipeline identifier such as `PL-3F9A`.
pub fn pipeline_id(seed: u16) -> String {
    format!("PL-{seed:04X}")
}

/// Clamp a requested listing size to `1..=MAX_ALERT_LIMIT`.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_ALERT_LIMIT)
        .clamp(1, MAX_ALERT_LIMIT)
}
