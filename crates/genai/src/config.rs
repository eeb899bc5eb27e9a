use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::AssessmentBackend;
use crate::gemini::{GeminiApi, GenerativeBackend, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODELS};
use crate::mock::LocalMock;
use crate::remote::RemoteClassifier;

/// Which assessment backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Mock,
    Gemini,
    Remote,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Gemini => "gemini",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "gemini" => Ok(Self::Gemini),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown assessment backend '{other}' (expected mock, gemini or remote)")),
        }
    }
}

/// Assessment pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AssessorConfig {
    pub backend: BackendKind,
    /// Bound on a single backend attempt.
    pub timeout: Duration,
    /// Concurrent backend calls admitted before `Backpressure`.
    pub max_in_flight: usize,
    /// `None` leaves the generative backend unavailable, not the server down.
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_models: Vec<String>,
    pub remote_url: Option<String>,
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            timeout: Duration::from_secs(20),
            max_in_flight: 8,
            gemini_api_key: None,
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_models: DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
            remote_url: None,
        }
    }
}

impl AssessorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                                |
    /// |----------------------------|--------------------------------------------------------|
    /// | `ASSESSMENT_BACKEND`       | `mock` (`mock`, `gemini` or `remote`)                  |
    /// | `ASSESSMENT_TIMEOUT_SECS`  | `20`                                                   |
    /// | `ASSESSMENT_MAX_IN_FLIGHT` | `8`                                                    |
    /// | `GOOGLE_GENAI_API_KEY`     | unset                                                  |
    /// | `GEMINI_API_URL`           | `https://generativelanguage.googleapis.com`            |
    /// | `GEMINI_MODELS`            | `gemini-2.0-flash,gemini-2.0-flash-lite,gemini-1.5-flash` |
    /// | `REMOTE_CLASSIFIER_URL`    | unset                                                  |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backend = match std::env::var("ASSESSMENT_BACKEND") {
            Ok(value) => value
                .parse()
                .unwrap_or_else(|e: String| panic!("ASSESSMENT_BACKEND is invalid: {e}")),
            Err(_) => defaults.backend,
        };

        let timeout_secs: u64 = std::env::var("ASSESSMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("ASSESSMENT_TIMEOUT_SECS must be a valid u64");

        let max_in_flight: usize = std::env::var("ASSESSMENT_MAX_IN_FLIGHT")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("ASSESSMENT_MAX_IN_FLIGHT must be a valid usize");
        assert!(max_in_flight > 0, "ASSESSMENT_MAX_IN_FLIGHT must be at least 1");

        let gemini_api_key = non_empty_var("GOOGLE_GENAI_API_KEY");
        let gemini_api_url = non_empty_var("GEMINI_API_URL").unwrap_or(defaults.gemini_api_url);
        let gemini_models = match non_empty_var("GEMINI_MODELS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.gemini_models,
        };

        Self {
            backend,
            timeout: Duration::from_secs(timeout_secs),
            max_in_flight,
            gemini_api_key,
            gemini_api_url,
            gemini_models,
            remote_url: non_empty_var("REMOTE_CLASSIFIER_URL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Instantiate the configured backend.
pub fn build_backend(config: &AssessorConfig) -> Arc<dyn AssessmentBackend> {
    match config.backend {
        BackendKind::Mock => Arc::new(LocalMock::new()),
        BackendKind::Gemini => {
            if config.gemini_api_key.is_none() {
                tracing::warn!("GOOGLE_GENAI_API_KEY is not set; assessments will report backend_unavailable");
            }
            let api = config
                .gemini_api_key
                .clone()
                .map(|key| GeminiApi::new(config.gemini_api_url.clone(), key));
            Arc::new(GenerativeBackend::new(api, config.gemini_models.clone()))
        }
        BackendKind::Remote => {
            if config.remote_url.is_none() {
                tracing::warn!("REMOTE_CLASSIFIER_URL is not set; assessments will report backend_unavailable");
            }
            Arc::new(RemoteClassifier::new(config.remote_url.clone()))
        }
    }
}
