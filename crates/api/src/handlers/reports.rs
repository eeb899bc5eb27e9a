//! Handlers for the `/reports` resource.
//!
//! A submission is validated up front; photos that fail to decode and
//! unknown wards reject the request and store nothing. Once the input is
//! valid the assessment runs and the report is stored whatever its outcome,
//! with failures recorded as such.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use jalsuraksha_core::alert::shutdown_alert_for;
use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{DigestEntry, DigestRequest, MAX_DIGEST_REPORTS};
use jalsuraksha_core::encoding::PhotoPayload;
use jalsuraksha_core::error::{AssessmentError, CoreError};
use jalsuraksha_core::report::{AssessmentState, EffectiveScore, ManualScore, ReviewStatus};
use jalsuraksha_core::types::{DbId, Timestamp};
use jalsuraksha_core::ward::canonical_ward;
use jalsuraksha_db::models::alert::CreateShutdownAlert;
use jalsuraksha_db::models::report::{CitizenReport, CreateCitizenReport, ReportFilter};
use jalsuraksha_db::repositories::{AlertRepo, ReportRepo};
use jalsuraksha_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::assessment::decode_off_runtime;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{validated, ReportListParams, DEFAULT_REPORT_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What a citizen sees of a report. Assessment failures are reduced to
/// `assessment_status: "unavailable"`.
#[derive(Debug, Serialize)]
pub struct CitizenReportView {
    pub id: DbId,
    pub ward: String,
    pub description: Option<String>,
    pub assessment_status: &'static str,
    pub result: Option<AssessmentResult>,
    pub review_status: ReviewStatus,
    pub created_at: Timestamp,
}

impl From<&CitizenReport> for CitizenReportView {
    fn from(report: &CitizenReport) -> Self {
        Self {
            id: report.id,
            ward: report.ward.clone(),
            description: report.description.clone(),
            assessment_status: report.assessment.public_status(),
            result: report.assessment.result().copied(),
            review_status: report.review_status,
            created_at: report.created_at,
        }
    }
}

/// What an admin sees: the full record plus the score that counts. The
/// photo itself is served separately by [`photo`].
#[derive(Debug, Serialize)]
pub struct AdminReportView {
    #[serde(flatten)]
    pub report: CitizenReport,
    pub effective_score: Option<EffectiveScore>,
}

impl From<CitizenReport> for AdminReportView {
    fn from(report: CitizenReport) -> Self {
        let effective_score = report.effective_score();
        Self {
            report,
            effective_score,
        }
    }
}

/// A report rendered for the caller's role.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportView {
    Admin(AdminReportView),
    Citizen(CitizenReportView),
}

impl ReportView {
    fn for_user(report: CitizenReport, user: &AuthUser) -> Self {
        if user.is_admin() {
            Self::Admin(report.into())
        } else {
            Self::Citizen((&report).into())
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /reports/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub decision: ReviewStatus,
}

/// Response body for `GET /reports/summary`.
#[derive(Debug, Serialize)]
pub struct ReportSummaryView {
    pub summary: String,
    /// Number of reports the summary covers.
    pub report_count: usize,
}

/// Request body for `POST /reports/{id}/manual-score`.
#[derive(Debug, Deserialize)]
pub struct ManualScoreInput {
    pub cleanliness_score: f64,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/reports
///
/// Multipart form with a required `file` field, a required `ward` field and
/// an optional `description` field.
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ReportView>>)> {
    let is_admin = user.is_admin();
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut ward: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((content_type, data.to_vec()));
            }
            "ward" => ward = Some(field.text().await.map_err(multipart_error)?),
            "description" => description = Some(field.text().await.map_err(multipart_error)?),
            _ => {} // ignore unknown fields
        }
    }

    let (content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let ward = ward.ok_or_else(|| AppError::BadRequest("Missing required 'ward' field".into()))?;

    let max_bytes = state.config.max_photo_bytes;
    let photo = decode_off_runtime(move || {
        PhotoPayload::from_bytes(bytes, content_type.as_deref(), max_bytes)
    })
    .await?
    .map_err(|e| AppError::for_audience(e, is_admin))?;
    let request = AssessmentRequest::new(photo, &ward, description.as_deref())
        .map_err(|e| AppError::for_audience(e, is_admin))?;

    let assessment = match state.assessor.assess(&request).await {
        Ok(result) => AssessmentState::Succeeded { result },
        // Not admitted, or the input itself is unusable: nothing is recorded.
        Err(e) if matches!(e, AssessmentError::Backpressure { .. }) || e.kind().is_user_correctable() => {
            return Err(AppError::for_audience(e, is_admin))
        }
        Err(e) => AssessmentState::Failed {
            kind: e.kind(),
            message: e.to_string(),
        },
    };

    let photo = request.photo();
    let report = ReportRepo::create(
        &state.pool,
        &CreateCitizenReport {
            ward: request.ward().to_string(),
            description: request.description().map(str::to_string),
            photo_mime: photo.mime().to_string(),
            photo_sha256: photo.sha256_hex(),
            photo: photo.bytes().to_vec(),
            submitted_by: user.subject.clone(),
            assessment,
        },
    )
    .await?;

    tracing::info!(
        report_id = report.id,
        ward = %report.ward,
        assessment = report.assessment.public_status(),
        "Citizen report submitted"
    );

    raise_alert_if_unsafe(&state.pool, &report).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ReportView::for_user(report, &user),
        }),
    ))
}

/// GET /api/v1/reports/mine
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<CitizenReportView>>>> {
    let reports = ReportRepo::list_by_submitter(&state.pool, &user.subject).await?;
    Ok(Json(DataResponse {
        data: reports.iter().map(CitizenReportView::from).collect(),
    }))
}

/// GET /api/v1/reports
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ReportListParams>,
) -> AppResult<Json<DataResponse<Vec<AdminReportView>>>> {
    let params = validated(params)?;

    let ward = match params.ward.as_deref() {
        Some(name) => Some(
            canonical_ward(name)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!("'{name}' is not a known ward")))
                })?
                .to_string(),
        ),
        None => None,
    };

    let filter = ReportFilter {
        ward,
        review_status: params.review_status,
        limit: params.limit.unwrap_or(DEFAULT_REPORT_LIMIT) as i64,
        offset: params.offset.unwrap_or(0) as i64,
    };
    let reports = ReportRepo::list(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: reports.into_iter().map(AdminReportView::from).collect(),
    }))
}

/// GET /api/v1/reports/{id}
///
/// Admins may read any report; citizens only their own. Other citizens'
/// reports are reported as not found.
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReportView>>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|r| user.is_admin() || r.submitted_by == user.subject)
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse {
        data: ReportView::for_user(report, &user),
    }))
}

/// GET /api/v1/reports/{id}/photo
///
/// The original upload with its content type. Same visibility rules as
/// [`get`].
pub async fn photo(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let photo = ReportRepo::find_photo(&state.pool, id)
        .await?
        .filter(|p| user.is_admin() || p.submitted_by == user.subject)
        .ok_or_else(|| not_found(id))?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.photo_mime),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        photo.photo,
    ))
}

/// GET /api/v1/reports/summary
///
/// A short narrative of trends across the most recent non-rejected reports.
/// Without any reports the backend is not consulted.
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ReportSummaryView>>> {
    let reports = ReportRepo::recent_for_digest(&state.pool, MAX_DIGEST_REPORTS as i64).await?;
    if reports.is_empty() {
        return Ok(Json(DataResponse {
            data: ReportSummaryView {
                summary: NO_REPORTS_SUMMARY.to_string(),
                report_count: 0,
            },
        }));
    }

    let entries = reports.iter().map(digest_entry).collect();
    let request = DigestRequest::new(entries)?;
    let digest = state.assessor.summarize(&request).await?;

    Ok(Json(DataResponse {
        data: ReportSummaryView {
            summary: digest.summary,
            report_count: request.entries().len(),
        },
    }))
}

/// POST /api/v1/reports/{id}/review
pub async fn review(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewInput>,
) -> AppResult<Json<DataResponse<AdminReportView>>> {
    if input.decision == ReviewStatus::Pending {
        return Err(AppError::Core(CoreError::Validation(
            "decision must be Approved or Rejected".into(),
        )));
    }

    let Some(report) =
        ReportRepo::update_review(&state.pool, id, input.decision, &admin.subject).await?
    else {
        let current = ReportRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {id} cannot move from {} to {}",
            current.review_status.as_str(),
            input.decision.as_str()
        ))));
    };
    tracing::info!(report_id = id, decision = input.decision.as_str(), "Report reviewed");

    Ok(Json(DataResponse { data: report.into() }))
}

/// POST /api/v1/reports/{id}/manual-score
pub async fn manual_score(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ManualScoreInput>,
) -> AppResult<Json<DataResponse<AdminReportView>>> {
    let score = ManualScore::new(input.cleanliness_score, input.ph, input.turbidity)?;
    let Some(report) = ReportRepo::set_manual_score(&state.pool, id, score, &admin.subject).await?
    else {
        ReportRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {id} has an automatic assessment; manual scoring is only allowed when it failed"
        ))));
    };

    tracing::info!(
        report_id = id,
        score = score.cleanliness_score,
        label = %score.status_label,
        "Manual score recorded"
    );
    raise_alert_if_unsafe(&state.pool, &report).await?;

    Ok(Json(DataResponse { data: report.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Summary returned when there is nothing to summarize.
pub const NO_REPORTS_SUMMARY: &str = "No recent citizen reports to summarize.";

/// Raise a shutdown alert for an unsafe, non-rejected report. A report that
/// already raised one is left alone.
async fn raise_alert_if_unsafe(pool: &DbPool, report: &CitizenReport) -> AppResult<()> {
    if report.review_status == ReviewStatus::Rejected {
        return Ok(());
    }
    let Some(score) = report.effective_score() else {
        return Ok(());
    };
    if let Some((severity, reason)) = shutdown_alert_for(&report.ward, score.status_label) {
        let created = AlertRepo::create(
            pool,
            &CreateShutdownAlert {
                ward: report.ward.clone(),
                reason,
                severity,
                report_id: Some(report.id),
            },
        )
        .await?;
        if created.is_none() {
            tracing::debug!(report_id = report.id, "Report already raised an alert");
        }
    }
    Ok(())
}

fn digest_entry(report: &CitizenReport) -> DigestEntry {
    let score = report.effective_score();
    DigestEntry {
        ward: report.ward.clone(),
        description: report.description.clone(),
        status_label: score.map(|s| s.status_label),
        cleanliness_score: score.map(|s| s.cleanliness_score),
        submitted_at: report.created_at,
    }
}

/// Oversized bodies surface as photo encoding failures; anything else is a
/// malformed form.
fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Assessment(AssessmentError::Encoding("photo exceeds the upload limit".into()))
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Report",
        id: id.to_string(),
    })
}
