use async_trait::async_trait;
use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{DigestRequest, ReportDigest};
use jalsuraksha_core::error::AssessmentError;

/// A pluggable source of cleanliness assessments and report digests.
///
/// Implementations perform exactly one attempt per call. Timeouts, retries
/// and admission control belong to [`crate::Assessor`].
#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    /// Short stable name, reported by the health endpoint and in logs.
    fn name(&self) -> &'static str;

    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError>;

    /// Summarize trends across recent citizen reports.
    async fn summarize(&self, request: &DigestRequest) -> Result<ReportDigest, AssessmentError>;
}
