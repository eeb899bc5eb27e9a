//! REST client for the Gemini `generateContent` endpoint.
//!
//! [`GeminiApi`] is the thin transport wrapper; [`GenerativeBackend`] turns it
//! into an [`AssessmentBackend`] that walks an ordered list of model
//! candidates.

use async_trait::async_trait;
use jalsuraksha_core::assessment::{parse_model_output, AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{parse_digest_output, DigestRequest, ReportDigest};
use jalsuraksha_core::error::AssessmentError;
use jalsuraksha_core::prompt::{build_digest_prompt, build_prompt, digest_schema, output_schema};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::AssessmentBackend;

/// Public Gemini API base URL.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Model candidates tried in order when none are configured.
pub const DEFAULT_GEMINI_MODELS: &[&str] =
    &["gemini-2.0-flash", "gemini-2.0-flash-lite", "gemini-1.5-flash"];

/// HTTP client for the Gemini API.
pub struct GeminiApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the Gemini REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx answer without a usable candidate text.
    #[error("Gemini response envelope is malformed: {0}")]
    Envelope(String),
}

impl GeminiApiError {
    /// Quota exhausted or model unknown: the next candidate may still work.
    pub fn is_candidate_skippable(&self) -> bool {
        matches!(self, Self::ApiError { status: 404 | 429, .. })
    }
}

impl From<GeminiApiError> for AssessmentError {
    fn from(err: GeminiApiError) -> Self {
        match err {
            GeminiApiError::Request(e) => AssessmentError::unreachable(format!("Gemini request failed: {e}")),
            GeminiApiError::ApiError { status, body } if status >= 500 => {
                AssessmentError::unreachable(format!("Gemini returned {status}: {}", truncate(&body)))
            }
            GeminiApiError::ApiError { status, body } => {
                AssessmentError::unavailable(format!("Gemini rejected the request ({status}): {}", truncate(&body)))
            }
            GeminiApiError::Envelope(msg) => AssessmentError::SchemaValidation(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://generativelanguage.googleapis.com`.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Send a `POST /v1beta/models/{model}:generateContent` request and
    /// return the text of the first candidate.
    pub async fn generate_content(&self, model: &str, body: &Value) -> Result<String, GeminiApiError> {
        let response = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.api_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        let envelope: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GeminiApiError::Envelope(format!("body is not a generateContent response: {e}")))?;

        let parts: Vec<String> = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if parts.is_empty() {
            return Err(GeminiApiError::Envelope("response has no candidate text".into()));
        }
        Ok(parts.concat())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GeminiApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Build the `generateContent` request body: prompt text, inline photo, and
/// a JSON response schema.
pub fn request_body(request: &AssessmentRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": build_prompt(request) },
                {
                    "inline_data": {
                        "mime_type": request.photo().mime(),
                        "data": request.photo().base64(),
                    }
                },
            ],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": output_schema(),
        },
    })
}

/// Build the `generateContent` request body for a report digest: text
/// only, answered as `{summary}`.
pub fn digest_request_body(request: &DigestRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_digest_prompt(request) }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": digest_schema(),
        },
    })
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Assessment backend backed by a hosted generative vision model.
pub struct GenerativeBackend {
    api: Option<GeminiApi>,
    models: Vec<String>,
}

impl GenerativeBackend {
    /// A backend without an API key fails every call with a non-transient
    /// `BackendUnavailable`.
    pub fn new(api: Option<GeminiApi>, models: Vec<String>) -> Self {
        Self { api, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[async_trait]
impl AssessmentBackend for GenerativeBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        let text = self.generate(&request_body(request), request.ward()).await?;
        parse_model_output(&text)
    }

    async fn summarize(&self, request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        let text = self.generate(&digest_request_body(request), "all").await?;
        parse_digest_output(&text)
    }
}

impl GenerativeBackend {
    /// Walk the model candidates until one answers. Quota and unknown-model
    /// errors move on to the next candidate; anything else stops the walk.
    async fn generate(&self, body: &Value, ward: &str) -> Result<String, AssessmentError> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| AssessmentError::unavailable("GOOGLE_GENAI_API_KEY is not configured"))?;

        let mut last_skip = None;
        for model in &self.models {
            match api.generate_content(model, body).await {
                Ok(text) => {
                    tracing::debug!(model = %model, ward, "Gemini candidate answered");
                    return Ok(text);
                }
                Err(e) if e.is_candidate_skippable() => {
                    tracing::warn!(model = %model, error = %e, "Gemini candidate unavailable, trying next");
                    last_skip = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AssessmentError::unavailable(match last_skip {
            Some(e) => format!("all Gemini model candidates exhausted, last error: {e}"),
            None => "no Gemini model candidates configured".to_string(),
        }))
    }
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
