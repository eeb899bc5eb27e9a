//! REST client for an external classifier service.
//!
//! The service speaks the assessment contract directly:
//! `POST {api_url}/assess` with `{photoDataUri, ward, description}` and a
//! result object on success. Digests go to `POST {api_url}/summarize` with
//! `{reports: [...]}` and come back as `{summary}`.

use async_trait::async_trait;
use jalsuraksha_core::assessment::{validate_value, AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{validate_digest_value, DigestEntry, DigestRequest, ReportDigest};
use jalsuraksha_core::error::AssessmentError;
use serde::Serialize;
use serde_json::Value;

use crate::backend::AssessmentBackend;

/// Errors from the classifier REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The classifier returned a non-2xx status code.
    #[error("Classifier API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx answer whose body is not JSON.
    #[error("Classifier response is not JSON: {0}")]
    Body(String),
}

impl From<ClassifierApiError> for AssessmentError {
    fn from(err: ClassifierApiError) -> Self {
        match err {
            ClassifierApiError::Request(e) => {
                AssessmentError::unreachable(format!("classifier request failed: {e}"))
            }
            ClassifierApiError::ApiError { status, body } if status >= 500 => {
                AssessmentError::unreachable(format!("classifier returned {status}: {body}"))
            }
            ClassifierApiError::ApiError { status, body } => {
                AssessmentError::unavailable(format!("classifier rejected the request ({status}): {body}"))
            }
            ClassifierApiError::Body(msg) => AssessmentError::SchemaValidation(msg),
        }
    }
}

/// Wire shape of an assessment request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessBody<'a> {
    photo_data_uri: String,
    ward: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Wire shape of a digest request.
#[derive(Debug, Serialize)]
struct SummarizeBody<'a> {
    reports: &'a [DigestEntry],
}

/// Assessment backend that delegates to a remote classifier.
pub struct RemoteClassifier {
    client: reqwest::Client,
    api_url: Option<String>,
}

impl RemoteClassifier {
    /// Create a classifier client. Without a URL every call fails with a
    /// non-transient `BackendUnavailable`.
    pub fn new(api_url: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a classifier client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Send one assessment request and return the raw JSON answer.
    pub async fn post_assess(
        &self,
        api_url: &str,
        request: &AssessmentRequest,
    ) -> Result<Value, ClassifierApiError> {
        let body = AssessBody {
            photo_data_uri: request.photo().to_data_uri(),
            ward: request.ward(),
            description: request.description(),
        };
        self.post_json(&format!("{api_url}/assess"), &body).await
    }

    /// Send one digest request and return the raw JSON answer.
    pub async fn post_summarize(
        &self,
        api_url: &str,
        request: &DigestRequest,
    ) -> Result<Value, ClassifierApiError> {
        let body = SummarizeBody {
            reports: request.entries(),
        };
        self.post_json(&format!("{api_url}/summarize"), &body).await
    }

    fn configured_url(&self) -> Result<&str, AssessmentError> {
        self.api_url
            .as_deref()
            .ok_or_else(|| AssessmentError::unavailable("REMOTE_CLASSIFIER_URL is not configured"))
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<Value, ClassifierApiError> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClassifierApiError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| ClassifierApiError::Body(e.to_string()))
    }
}

#[async_trait]
impl AssessmentBackend for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        let value = self.post_assess(self.configured_url()?, request).await?;
        validate_value(&value)
    }

    async fn summarize(&self, request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        let value = self.post_summarize(self.configured_url()?, request).await?;
        validate_digest_value(&value)
    }
}
