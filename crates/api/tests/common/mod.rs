//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use jalsuraksha_api::auth::jwt::JwtConfig;
use jalsuraksha_api::auth::password::hash_password;
use jalsuraksha_api::config::{AdminAccount, ServerConfig};
use jalsuraksha_api::router::build_app_router;
use jalsuraksha_api::state::AppState;
use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{DigestRequest, ReportDigest};
use jalsuraksha_core::encoding::{PhotoPayload, MAX_PHOTO_BYTES};
use jalsuraksha_core::error::AssessmentError;
use jalsuraksha_genai::mock::LocalMock;
use jalsuraksha_genai::{AssessmentBackend, Assessor, AssessorConfig};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@indore.gov.in";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery-staple";

pub const CLEAR_WATER: [u8; 3] = [200, 220, 255];
pub const BROWN_WATER: [u8; 3] = [140, 100, 40];

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:9002".to_string()],
        request_timeout_secs: 30,
        max_photo_bytes: MAX_PHOTO_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        admin: AdminAccount {
            email: ADMIN_EMAIL.to_string(),
            password_hash: Some(hash_password(ADMIN_PASSWORD).unwrap()),
        },
        assessor: AssessorConfig {
            timeout: Duration::from_secs(5),
            ..AssessorConfig::default()
        },
    }
}

/// Build the full application router around `backend` and a migrated test
/// database, also returning the state so tests can observe the assessor.
pub fn build_test_app_and_state(
    pool: PgPool,
    backend: Arc<dyn AssessmentBackend>,
    max_in_flight: usize,
) -> (Router, AppState) {
    let config = test_config();
    let assessor = Assessor::new(backend, config.assessor.timeout, max_in_flight);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        assessor: Arc::new(assessor),
    };
    (build_app_router(state.clone(), &config), state)
}

/// Build the full application router around `backend`.
pub fn build_test_app_with(pool: PgPool, backend: Arc<dyn AssessmentBackend>, max_in_flight: usize) -> Router {
    build_test_app_and_state(pool, backend, max_in_flight).0
}

/// The full application with the offline backend.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(LocalMock::new()), 8)
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Answers every call with the same outcome. A successful outcome
/// summarizes as [`FIXED_DIGEST`].
pub struct Fixed(pub Result<AssessmentResult, AssessmentError>);

pub const FIXED_DIGEST: &str = "Complaints cluster in the eastern wards.";

#[async_trait]
impl AssessmentBackend for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn assess(&self, _request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        self.0.clone()
    }

    async fn summarize(&self, _request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        self.0.clone().map(|_| ReportDigest {
            summary: FIXED_DIGEST.to_string(),
        })
    }
}

/// Never answers; holds its permit until the test ends.
pub struct Stalled;

#[async_trait]
impl AssessmentBackend for Stalled {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn assess(&self, _request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        std::future::pending().await
    }

    async fn summarize(&self, _request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

const BOUNDARY: &str = "jalsuraksha-test-boundary";

/// A multipart form part: name, optional (filename, content type), bytes.
pub struct Part<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub data: Vec<u8>,
}

pub fn text_part<'a>(name: &'a str, value: &str) -> Part<'a> {
    Part {
        name,
        file: None,
        data: value.as_bytes().to_vec(),
    }
}

pub fn file_part<'a>(content_type: &'a str, data: Vec<u8>) -> Part<'a> {
    Part {
        name: "file",
        file: Some(("sample", content_type)),
        data,
    }
}

pub async fn post_multipart(app: &Router, uri: &str, parts: Vec<Part<'_>>, token: &str) -> Response<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Submit a PNG of a single color as a citizen report.
pub async fn submit_report(app: &Router, token: &str, ward: &str, color: [u8; 3]) -> Response<Body> {
    post_multipart(
        app,
        "/api/v1/reports",
        vec![
            file_part("image/png", png_bytes(color)),
            text_part("ward", ward),
            text_part("description", "water from the street tap"),
        ],
        token,
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then parse the body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Sessions and fixtures
// ---------------------------------------------------------------------------

pub async fn citizen_token(app: &Router) -> String {
    let response = post_json(app, "/api/v1/auth/login", json!({"role": "citizen"}), None).await;
    let json = expect_json(response, StatusCode::OK).await;
    json["access_token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"role": "admin", "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        None,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// A PNG with its final `cut` bytes removed: the header still sniffs as PNG
/// but the pixel data is incomplete.
pub fn truncated_png_bytes(color: [u8; 3], cut: usize) -> Vec<u8> {
    let mut bytes = png_bytes(color);
    bytes.truncate(bytes.len() - cut);
    bytes
}

pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(16, 16, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A PNG of a single color as a data URI.
pub fn png_data_uri(color: [u8; 3]) -> String {
    PhotoPayload::from_bytes(png_bytes(color), None, MAX_PHOTO_BYTES)
        .unwrap()
        .to_data_uri()
}

pub fn clear_water_result() -> AssessmentResult {
    serde_json::from_value(json!({
        "cleanlinessScore": 0.92,
        "statusLabel": "Safe",
        "estimatedPH": 7.1,
        "estimatedTurbidity": 0.8,
    }))
    .unwrap()
}
