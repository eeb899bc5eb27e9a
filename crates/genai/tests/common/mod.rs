//! Shared helpers for genai integration tests.
#![allow(dead_code)]

use std::io::Cursor;

use axum::Router;
use image::{ImageFormat, Rgb, RgbImage};
use jalsuraksha_core::assessment::AssessmentRequest;
use jalsuraksha_core::encoding::{PhotoPayload, MAX_PHOTO_BYTES};
use serde_json::{json, Value};

/// A small PNG request for the given ward.
pub fn request(ward: &str) -> AssessmentRequest {
    let img = RgbImage::from_pixel(8, 8, Rgb([180, 200, 230]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    let photo = PhotoPayload::from_bytes(out.into_inner(), Some("image/png"), MAX_PHOTO_BYTES).unwrap();
    AssessmentRequest::new(photo, ward, Some("tap water from the morning supply")).unwrap()
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn clear_water() -> Value {
    json!({
        "cleanlinessScore": 0.92,
        "statusLabel": "Safe",
        "estimatedPH": 7.1,
        "estimatedTurbidity": 0.8,
    })
}

/// Wrap model text in a `generateContent` response envelope.
pub fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
        }]
    })
}
