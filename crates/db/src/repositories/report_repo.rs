//! Repository for the `citizen_reports` table.

use jalsuraksha_core::report::{AssessmentState, EffectiveScore, ManualScore, ReviewStatus};
use jalsuraksha_core::types::DbId;
use sqlx::PgPool;

use crate::models::report::{
    CitizenReport, CreateCitizenReport, ReportFilter, ReportPhoto, REPORT_COLUMNS,
};

/// Provides CRUD operations for citizen reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report in review state `Pending`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCitizenReport,
    ) -> Result<CitizenReport, sqlx::Error> {
        let (state, result, failure) = match &input.assessment {
            AssessmentState::Succeeded { result } => ("succeeded", Some(result), None),
            AssessmentState::Failed { kind, message } => {
                ("failed", None, Some((kind.as_str(), message.as_str())))
            }
        };

        let query = format!(
            "INSERT INTO citizen_reports
                (ward, description, photo_mime, photo_size_bytes, photo_sha256, photo,
                 submitted_by, assessment_state, ai_cleanliness_score, ai_status_label,
                 ai_estimated_ph, ai_estimated_turbidity, failure_kind, failure_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {REPORT_COLUMNS}"
        );
        let report = sqlx::query_as::<_, CitizenReport>(&query)
            .bind(&input.ward)
            .bind(&input.description)
            .bind(&input.photo_mime)
            .bind(input.photo.len() as i64)
            .bind(&input.photo_sha256)
            .bind(&input.photo)
            .bind(&input.submitted_by)
            .bind(state)
            .bind(result.map(|r| r.cleanliness_score))
            .bind(result.map(|r| r.status_label.as_str()))
            .bind(result.map(|r| r.estimated_ph))
            .bind(result.map(|r| r.estimated_turbidity))
            .bind(failure.map(|(kind, _)| kind))
            .bind(failure.map(|(_, message)| message))
            .fetch_one(pool)
            .await?;

        tracing::debug!(report_id = report.id, ward = %report.ward, "Citizen report stored");
        Ok(report)
    }

    /// Find a report by its internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CitizenReport>, sqlx::Error> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM citizen_reports WHERE id = $1");
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load the stored photo of a report.
    pub async fn find_photo(pool: &PgPool, id: DbId) -> Result<Option<ReportPhoto>, sqlx::Error> {
        sqlx::query_as::<_, ReportPhoto>(
            "SELECT id, submitted_by, photo_mime, photo FROM citizen_reports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List reports matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<CitizenReport>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM citizen_reports
             WHERE ($1::TEXT IS NULL OR ward = $1)
               AND ($2::TEXT IS NULL OR review_status = $2)
             ORDER BY id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(&filter.ward)
            .bind(filter.review_status.map(ReviewStatus::as_str))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// List all reports submitted by a session subject, newest first.
    pub async fn list_by_submitter(
        pool: &PgPool,
        subject: &str,
    ) -> Result<Vec<CitizenReport>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM citizen_reports
             WHERE submitted_by = $1
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(subject)
            .fetch_all(pool)
            .await
    }

    /// Record an admin review decision on a pending report.
    ///
    /// Returns `None` when the report does not exist or was already decided.
    pub async fn update_review(
        pool: &PgPool,
        id: DbId,
        status: ReviewStatus,
        reviewer: &str,
    ) -> Result<Option<CitizenReport>, sqlx::Error> {
        let query = format!(
            "UPDATE citizen_reports
             SET review_status = $2, reviewed_by = $3, reviewed_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND review_status = 'Pending'
             RETURNING {REPORT_COLUMNS}"
        );
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(reviewer)
            .fetch_optional(pool)
            .await
    }

    /// Attach (or replace) a manual score on a report whose automatic
    /// assessment failed.
    ///
    /// Returns `None` when the report does not exist or has an automatic
    /// result.
    pub async fn set_manual_score(
        pool: &PgPool,
        id: DbId,
        score: ManualScore,
        reviewer: &str,
    ) -> Result<Option<CitizenReport>, sqlx::Error> {
        let query = format!(
            "UPDATE citizen_reports
             SET manual_cleanliness_score = $2, manual_status_label = $3,
                 manual_ph = $4, manual_turbidity = $5,
                 reviewed_by = $6, updated_at = NOW()
             WHERE id = $1 AND assessment_state = 'failed'
             RETURNING {REPORT_COLUMNS}"
        );
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(id)
            .bind(score.cleanliness_score)
            .bind(score.status_label.as_str())
            .bind(score.ph)
            .bind(score.turbidity)
            .bind(reviewer)
            .fetch_optional(pool)
            .await
    }

    /// Effective scores of every non-rejected report, paired with its ward,
    /// oldest first.
    pub async fn scored_by_ward(pool: &PgPool) -> Result<Vec<(String, EffectiveScore)>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM citizen_reports
             WHERE review_status <> 'Rejected'
             ORDER BY id ASC"
        );
        let reports = sqlx::query_as::<_, CitizenReport>(&query)
            .fetch_all(pool)
            .await?;
        Ok(reports
            .into_iter()
            .filter_map(|r| r.effective_score().map(|s| (r.ward, s)))
            .collect())
    }

    /// Cleanliness scores of every non-rejected, automatically assessed report.
    pub async fn ai_scores(pool: &PgPool) -> Result<Vec<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            "SELECT ai_cleanliness_score FROM citizen_reports
             WHERE review_status <> 'Rejected' AND assessment_state = 'succeeded'",
        )
        .fetch_all(pool)
        .await
    }

    /// The most recent non-rejected reports, newest first.
    pub async fn recent_for_digest(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<CitizenReport>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM citizen_reports
             WHERE review_status <> 'Rejected'
             ORDER BY id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, CitizenReport>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
