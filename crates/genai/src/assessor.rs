//! Front door for every backend call.
//!
//! Admission control is a non-blocking semaphore acquire: when all permits
//! are taken the call fails with `Backpressure` instead of queueing. Each
//! admitted call gets at most two attempts, the second only after a
//! retryable failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{DigestRequest, ReportDigest};
use jalsuraksha_core::error::AssessmentError;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::backend::AssessmentBackend;
use crate::config::AssessorConfig;

pub struct Assessor {
    backend: Arc<dyn AssessmentBackend>,
    timeout: Duration,
    permits: Semaphore,
    max_in_flight: usize,
}

impl Assessor {
    pub fn new(backend: Arc<dyn AssessmentBackend>, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            backend,
            timeout,
            permits: Semaphore::new(max_in_flight),
            max_in_flight,
        }
    }

    pub fn from_config(backend: Arc<dyn AssessmentBackend>, config: &AssessorConfig) -> Self {
        Self::new(backend, config.timeout, config.max_in_flight)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Permits currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Assess one request.
    ///
    /// Returns either a result that satisfies every schema invariant or a
    /// tagged failure. Never returns a substitute result.
    pub async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        let _permit = self.admit()?;

        let outcome = self
            .with_retry("Assessment", request.ward(), move || async move {
                let result = self.timed(self.backend.assess(request)).await?;
                result.validate()?;
                Ok(result)
            })
            .await;

        match &outcome {
            Ok(result) => tracing::info!(
                backend = self.backend.name(),
                ward = request.ward(),
                score = result.cleanliness_score,
                label = %result.status_label,
                "Assessment completed"
            ),
            Err(e) => tracing::error!(
                backend = self.backend.name(),
                ward = request.ward(),
                kind = e.kind().as_str(),
                error = %e,
                "Assessment failed"
            ),
        }
        outcome
    }

    /// Summarize recent reports, under the same admission, timeout and
    /// retry rules as [`Assessor::assess`].
    pub async fn summarize(&self, request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        let _permit = self.admit()?;
        let reports = request.entries().len();

        let outcome = self
            .with_retry("Digest", "all", move || async move {
                let digest = self.timed(self.backend.summarize(request)).await?;
                digest.validate()?;
                Ok(digest)
            })
            .await;

        match &outcome {
            Ok(digest) => tracing::info!(
                backend = self.backend.name(),
                reports,
                chars = digest.summary.chars().count(),
                "Report digest completed"
            ),
            Err(e) => tracing::error!(
                backend = self.backend.name(),
                reports,
                kind = e.kind().as_str(),
                error = %e,
                "Report digest failed"
            ),
        }
        outcome
    }

    fn admit(&self) -> Result<SemaphorePermit<'_>, AssessmentError> {
        self.permits.try_acquire().map_err(|_| {
            tracing::warn!(limit = self.max_in_flight, "Backend call rejected, in-flight limit reached");
            AssessmentError::Backpressure {
                limit: self.max_in_flight,
            }
        })
    }

    /// Run `attempt`, and once more if the first failure is retryable.
    async fn with_retry<T, F, Fut>(&self, what: &str, ward: &str, attempt: F) -> Result<T, AssessmentError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AssessmentError>>,
    {
        match attempt().await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    backend = self.backend.name(),
                    ward,
                    error = %e,
                    "{what} attempt failed, retrying once"
                );
                attempt().await
            }
            other => other,
        }
    }

    async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, AssessmentError>>,
    ) -> Result<T, AssessmentError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| AssessmentError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            })?
    }
}
