//! Citizen report rows and DTOs.

use jalsuraksha_core::assessment::AssessmentResult;
use jalsuraksha_core::error::AssessmentErrorKind;
use jalsuraksha_core::report::{
    effective_score, AssessmentState, EffectiveScore, ManualScore, ReviewStatus,
};
use jalsuraksha_core::status::StatusLabel;
use jalsuraksha_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// Column list for `citizen_reports` queries. The photo bytes are only read
/// by [`ReportPhoto`].
pub const REPORT_COLUMNS: &str = "id, ward, description, photo_mime, photo_size_bytes, \
    photo_sha256, submitted_by, assessment_state, ai_cleanliness_score, ai_status_label, \
    ai_estimated_ph, ai_estimated_turbidity, failure_kind, failure_message, \
    manual_cleanliness_score, manual_status_label, manual_ph, manual_turbidity, \
    review_status, reviewed_by, reviewed_at, created_at, updated_at";

/// A stored citizen submission together with its assessment outcome.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenReport {
    pub id: DbId,
    pub ward: String,
    pub description: Option<String>,
    pub photo_mime: String,
    pub photo_size_bytes: i64,
    pub photo_sha256: String,
    /// Session subject of the submitter.
    pub submitted_by: String,
    pub assessment: AssessmentState,
    pub manual_score: Option<ManualScore>,
    pub review_status: ReviewStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CitizenReport {
    /// The score that counts for this report, if any.
    pub fn effective_score(&self) -> Option<EffectiveScore> {
        effective_score(&self.assessment, self.manual_score.as_ref())
    }
}

impl<'r> FromRow<'r, PgRow> for CitizenReport {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let assessment = match row.try_get::<String, _>("assessment_state")?.as_str() {
            "succeeded" => AssessmentState::Succeeded {
                result: AssessmentResult {
                    cleanliness_score: row.try_get("ai_cleanliness_score")?,
                    status_label: label_column(row, "ai_status_label")?,
                    estimated_ph: row.try_get("ai_estimated_ph")?,
                    estimated_turbidity: row.try_get("ai_estimated_turbidity")?,
                },
            },
            "failed" => {
                let kind: String = row.try_get("failure_kind")?;
                AssessmentState::Failed {
                    kind: AssessmentErrorKind::parse(&kind)
                        .ok_or_else(|| decode_error("failure_kind", &kind))?,
                    message: row
                        .try_get::<Option<String>, _>("failure_message")?
                        .unwrap_or_default(),
                }
            }
            other => return Err(decode_error("assessment_state", other)),
        };

        let manual_score = match row.try_get::<Option<f64>, _>("manual_cleanliness_score")? {
            Some(cleanliness_score) => Some(ManualScore {
                cleanliness_score,
                status_label: label_column(row, "manual_status_label")?,
                ph: row.try_get("manual_ph")?,
                turbidity: row.try_get("manual_turbidity")?,
            }),
            None => None,
        };

        let review: String = row.try_get("review_status")?;
        Ok(Self {
            id: row.try_get("id")?,
            ward: row.try_get("ward")?,
            description: row.try_get("description")?,
            photo_mime: row.try_get("photo_mime")?,
            photo_size_bytes: row.try_get("photo_size_bytes")?,
            photo_sha256: row.try_get("photo_sha256")?,
            submitted_by: row.try_get("submitted_by")?,
            assessment,
            manual_score,
            review_status: ReviewStatus::parse(&review)
                .ok_or_else(|| decode_error("review_status", &review))?,
            reviewed_by: row.try_get("reviewed_by")?,
            reviewed_at: row.try_get("reviewed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn label_column(row: &PgRow, column: &str) -> Result<StatusLabel, sqlx::Error> {
    let value: String = row.try_get(column)?;
    StatusLabel::parse(&value).ok_or_else(|| decode_error(column, &value))
}

pub(crate) fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unexpected value {value:?}").into(),
    }
}

/// The stored photo of a report, with what is needed to authorize access.
#[derive(Debug, Clone, FromRow)]
pub struct ReportPhoto {
    pub id: DbId,
    pub submitted_by: String,
    pub photo_mime: String,
    pub photo: Vec<u8>,
}

/// DTO for creating a report.
#[derive(Debug, Clone)]
pub struct CreateCitizenReport {
    pub ward: String,
    pub description: Option<String>,
    pub photo_mime: String,
    pub photo_sha256: String,
    pub photo: Vec<u8>,
    pub submitted_by: String,
    pub assessment: AssessmentState,
}

/// Listing filter for the admin report queue.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub ward: Option<String>,
    pub review_status: Option<ReviewStatus>,
    pub limit: i64,
    pub offset: i64,
}
