//! Trend digests over recent citizen reports.
//!
//! Admins ask for a short narrative of what recent reports have in common.
//! The backend sees each report's ward, the citizen's words and whatever
//! score the report carries; photos are not resent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssessmentError;
use crate::status::StatusLabel;
use crate::types::Timestamp;

pub const FIELD_SUMMARY: &str = "summary";

/// Most reports fed into one digest.
pub const MAX_DIGEST_REPORTS: usize = 20;

/// Longest summary accepted from a backend, in characters.
pub const MAX_SUMMARY_CHARS: usize = 4000;

/// One report as seen by the digest backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEntry {
    pub ward: String,
    pub description: Option<String>,
    pub status_label: Option<StatusLabel>,
    pub cleanliness_score: Option<f64>,
    pub submitted_at: Timestamp,
}

/// A non-empty, bounded batch of reports, newest first.
#[derive(Debug, Clone)]
pub struct DigestRequest {
    entries: Vec<DigestEntry>,
}

impl DigestRequest {
    /// Keeps at most [`MAX_DIGEST_REPORTS`] entries, in the given order.
    pub fn new(mut entries: Vec<DigestEntry>) -> Result<Self, AssessmentError> {
        if entries.is_empty() {
            return Err(AssessmentError::InvalidRequest(
                "there are no reports to summarize".into(),
            ));
        }
        entries.truncate(MAX_DIGEST_REPORTS);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DigestEntry] {
        &self.entries
    }
}

/// A backend's summary of recent reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDigest {
    pub summary: String,
}

impl ReportDigest {
    pub fn validate(&self) -> Result<(), AssessmentError> {
        let chars = self.summary.trim().chars().count();
        if chars == 0 {
            return Err(AssessmentError::SchemaValidation(format!(
                "{FIELD_SUMMARY} must not be empty"
            )));
        }
        if chars > MAX_SUMMARY_CHARS {
            return Err(AssessmentError::SchemaValidation(format!(
                "{FIELD_SUMMARY} is {chars} characters, limit is {MAX_SUMMARY_CHARS}"
            )));
        }
        Ok(())
    }
}

/// Parse raw backend text (expected to be one JSON object) into a digest.
pub fn parse_digest_output(raw: &str) -> Result<ReportDigest, AssessmentError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|e| {
        AssessmentError::SchemaValidation(format!("response is not valid JSON: {e}"))
    })?;
    validate_digest_value(&value)
}

/// Validate an already-parsed JSON value against the digest schema.
pub fn validate_digest_value(value: &Value) -> Result<ReportDigest, AssessmentError> {
    let summary = match value.get(FIELD_SUMMARY) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => {
            return Err(AssessmentError::SchemaValidation(format!(
                "missing required field {FIELD_SUMMARY}"
            )))
        }
        Some(other) => {
            return Err(AssessmentError::SchemaValidation(format!(
                "{FIELD_SUMMARY} must be a string, got {other}"
            )))
        }
    };
    let digest = ReportDigest { summary };
    digest.validate()?;
    Ok(digest)
}
