//! Integration tests for the citizen report lifecycle.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    admin_token, build_test_app, build_test_app_and_state, build_test_app_with, citizen_token,
    clear_water_result, expect_json, file_part, get, png_bytes, post_json, post_multipart,
    submit_report, text_part, truncated_png_bytes, Fixed, Stalled, BROWN_WATER, CLEAR_WATER,
    FIXED_DIGEST,
};
use http_body_util::BodyExt;
use jalsuraksha_api::handlers::reports::NO_REPORTS_SUMMARY;
use jalsuraksha_core::error::AssessmentError;
use serde_json::json;
use sqlx::PgPool;

fn failing_app(pool: PgPool) -> axum::Router {
    build_test_app_with(
        pool,
        Arc::new(Fixed(Err(AssessmentError::unavailable("GOOGLE_GENAI_API_KEY is not configured")))),
        4,
    )
}

async fn report_count(app: &axum::Router) -> usize {
    let admin = admin_token(app).await;
    let json = expect_json(get(app, "/api/v1/reports", Some(&admin)).await, StatusCode::OK).await;
    json["data"].as_array().unwrap().len()
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn clear_water_report_is_stored_with_result(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;

    let response = submit_report(&app, &token, "rajendra nagar", CLEAR_WATER).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    let data = &json["data"];
    assert_eq!(data["ward"], "Rajendra Nagar");
    assert_eq!(data["assessment_status"], "completed");
    assert_eq!(data["result"]["statusLabel"], "Safe");
    assert_eq!(data["review_status"], "Pending");
    assert!(data.get("photo_data_uri").is_none(), "citizens do not get the raw record");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unsafe_report_raises_a_shutdown_alert(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;

    let json = expect_json(submit_report(&app, &token, "Annapurna", BROWN_WATER).await, StatusCode::CREATED).await;
    assert_eq!(json["data"]["result"]["statusLabel"], "Unsafe");
    let report_id = json["data"]["id"].clone();

    let alerts = expect_json(get(&app, "/api/v1/alerts", None).await, StatusCode::OK).await;
    let alerts = alerts["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["ward"], "Annapurna");
    assert_eq!(alerts[0]["severity"], "Critical");
    assert_eq!(alerts[0]["report_id"], report_id);
    assert!(alerts[0]["pipeline_id"].as_str().unwrap().starts_with("PL-"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_assessment_is_stored_as_unavailable(pool: PgPool) {
    let app = failing_app(pool);
    let token = citizen_token(&app).await;

    let json = expect_json(submit_report(&app, &token, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    assert_eq!(json["data"]["assessment_status"], "unavailable");
    assert!(json["data"]["result"].is_null());
    let serialized = json.to_string();
    assert!(!serialized.contains("backend_unavailable"));
    assert!(!serialized.contains("GOOGLE_GENAI_API_KEY"));

    let admin = admin_token(&app).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let full = expect_json(get(&app, &format!("/api/v1/reports/{id}"), Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(full["data"]["assessment"]["state"], "failed");
    assert_eq!(full["data"]["assessment"]["kind"], "backend_unavailable");
    assert!(full["data"]["effective_score"].is_null());

    let alerts = expect_json(get(&app, "/api/v1/alerts", None).await, StatusCode::OK).await;
    assert!(alerts["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn oversized_photo_is_rejected_without_a_record(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;

    let mut bytes = png_bytes(CLEAR_WATER);
    bytes.resize(5 * 1024 * 1024 + 1, 0);
    let response = post_multipart(
        &app,
        "/api/v1/reports",
        vec![file_part("image/png", bytes), text_part("ward", "Rau")],
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["kind"], "encoding_error");
    assert_eq!(report_count(&app).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mismatched_content_type_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;
    let response = post_multipart(
        &app,
        "/api/v1/reports",
        vec![file_part("image/jpeg", png_bytes(CLEAR_WATER)), text_part("ward", "Rau")],
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["kind"], "encoding_error");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_ward_is_rejected_without_a_record(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;
    let json = expect_json(submit_report(&app, &token, "Atlantis", CLEAR_WATER).await, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["kind"], "invalid_request");
    assert_eq!(report_count(&app).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn truncated_photo_is_rejected_without_a_record(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;
    let response = post_multipart(
        &app,
        "/api/v1/reports",
        vec![
            file_part("image/png", truncated_png_bytes(CLEAR_WATER, 20)),
            text_part("ward", "Rau"),
        ],
        &token,
    )
    .await;
    let json = expect_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["kind"], "encoding_error");
    assert_eq!(report_count(&app).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn backend_encoding_failure_is_rejected_without_a_record(pool: PgPool) {
    let app = build_test_app_with(
        pool,
        Arc::new(Fixed(Err(AssessmentError::Encoding("backend could not read the photo".into())))),
        4,
    );
    let token = citizen_token(&app).await;
    let json = expect_json(
        submit_report(&app, &token, "Rau", CLEAR_WATER).await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(json["kind"], "encoding_error");
    assert_eq!(report_count(&app).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_fields_are_bad_requests(pool: PgPool) {
    let app = build_test_app(pool);
    let token = citizen_token(&app).await;

    let no_ward = post_multipart(&app, "/api/v1/reports", vec![file_part("image/png", png_bytes(CLEAR_WATER))], &token).await;
    assert_eq!(no_ward.status(), StatusCode::BAD_REQUEST);

    let no_file = post_multipart(&app, "/api/v1/reports", vec![text_part("ward", "Rau")], &token).await;
    assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn saturated_assessor_rejects_without_a_record(pool: PgPool) {
    let (app, state) = build_test_app_and_state(pool, Arc::new(Stalled), 1);
    let token = citizen_token(&app).await;

    let held = {
        let app = app.clone();
        let token = token.clone();
        tokio::spawn(async move { submit_report(&app, &token, "Rau", CLEAR_WATER).await })
    };
    while state.assessor.available_permits() > 0 {
        tokio::task::yield_now().await;
    }

    let response = submit_report(&app, &token, "Rau", CLEAR_WATER).await;
    let json = expect_json(response, StatusCode::TOO_MANY_REQUESTS).await;
    assert_eq!(json["code"], "SUBMISSION_FAILED");
    held.abort();
    assert_eq!(report_count(&app).await, 0);
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn citizens_only_see_their_own_reports(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = citizen_token(&app).await;
    let bob = citizen_token(&app).await;

    let created = expect_json(submit_report(&app, &alice, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();
    submit_report(&app, &bob, "Sukhliya", CLEAR_WATER).await;

    let mine = expect_json(get(&app, "/api/v1/reports/mine", Some(&alice)).await, StatusCode::OK).await;
    let mine = mine["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["ward"], "Rau");

    let own = get(&app, &format!("/api/v1/reports/{id}"), Some(&alice)).await;
    assert_eq!(own.status(), StatusCode::OK);
    let other = get(&app, &format!("/api/v1/reports/{id}"), Some(&bob)).await;
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let queue = get(&app, "/api/v1/reports", Some(&alice)).await;
    assert_eq!(queue.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_queue_filters_by_ward_and_status(pool: PgPool) {
    let app = build_test_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    submit_report(&app, &citizen, "Rau", CLEAR_WATER).await;
    submit_report(&app, &citizen, "Annapurna", BROWN_WATER).await;
    submit_report(&app, &citizen, "Rau", BROWN_WATER).await;

    let rau = expect_json(get(&app, "/api/v1/reports?ward=rau", Some(&admin)).await, StatusCode::OK).await;
    let rau = rau["data"].as_array().unwrap();
    assert_eq!(rau.len(), 2);
    assert!(rau[0]["id"].as_i64() > rau[1]["id"].as_i64(), "newest first");
    assert!(rau.iter().all(|r| r.get("photo_data_uri").is_none() && r.get("photo").is_none()));
    assert_eq!(rau[0]["photo_mime"], "image/png");

    let paged = expect_json(get(&app, "/api/v1/reports?limit=1&offset=1", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(paged["data"].as_array().unwrap().len(), 1);

    let pending = expect_json(get(&app, "/api/v1/reports?review_status=Pending", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(pending["data"].as_array().unwrap().len(), 3);

    let too_many = get(&app, "/api/v1/reports?limit=500", Some(&admin)).await;
    assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);

    let unknown = get(&app, "/api/v1/reports?ward=Atlantis", Some(&admin)).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn photo_is_served_to_its_owner_and_admins(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = citizen_token(&app).await;
    let bob = citizen_token(&app).await;
    let admin = admin_token(&app).await;

    let created = expect_json(submit_report(&app, &alice, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    let uri = format!("/api/v1/reports/{}/photo", created["data"]["id"]);

    for token in [&alice, &admin] {
        let response = get(&app, &uri, Some(token.as_str())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), png_bytes(CLEAR_WATER).as_slice());
    }

    assert_eq!(get(&app, &uri, Some(&bob)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, &uri, None).await.status(), StatusCode::UNAUTHORIZED);
    let missing = get(&app, "/api/v1/reports/999/photo", Some(&admin)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Review and manual scoring
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn review_decides_exactly_once(pool: PgPool) {
    let app = build_test_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    let created = expect_json(submit_report(&app, &citizen, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/reports/{id}/review");

    let forbidden = post_json(&app, &uri, json!({"decision": "Approved"}), Some(&citizen)).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let pending = post_json(&app, &uri, json!({"decision": "Pending"}), Some(&admin)).await;
    assert_eq!(pending.status(), StatusCode::BAD_REQUEST);

    let approved = expect_json(post_json(&app, &uri, json!({"decision": "Approved"}), Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(approved["data"]["review_status"], "Approved");
    assert_eq!(approved["data"]["reviewed_by"], common::ADMIN_EMAIL);

    let again = expect_json(post_json(&app, &uri, json!({"decision": "Rejected"}), Some(&admin)).await, StatusCode::CONFLICT).await;
    assert_eq!(again["code"], "CONFLICT");

    let missing = post_json(&app, "/api/v1/reports/999/review", json!({"decision": "Approved"}), Some(&admin)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn manual_score_stands_in_for_a_failed_assessment(pool: PgPool) {
    let app = failing_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    let created = expect_json(submit_report(&app, &citizen, "Navlakha", CLEAR_WATER).await, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/reports/{id}/manual-score");

    let out_of_range = post_json(&app, &uri, json!({"cleanliness_score": 1.5}), Some(&admin)).await;
    assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);

    let scored = expect_json(
        post_json(&app, &uri, json!({"cleanliness_score": 0.2, "ph": 6.1, "turbidity": 9.0}), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(scored["data"]["manual_score"]["status_label"], "Unsafe");
    assert_eq!(scored["data"]["effective_score"]["cleanliness_score"], 0.2);

    let alerts = expect_json(get(&app, "/api/v1/alerts", None).await, StatusCode::OK).await;
    assert_eq!(alerts["data"][0]["ward"], "Navlakha");

    let ward = expect_json(get(&app, "/api/v1/wards/Navlakha", None).await, StatusCode::OK).await;
    assert_eq!(ward["data"]["status"], "Unsafe");
    assert_eq!(ward["data"]["source"], "reports");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn manual_score_is_refused_when_assessment_succeeded(pool: PgPool) {
    let app = build_test_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    let created = expect_json(submit_report(&app, &citizen, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/reports/{id}/manual-score"),
        json!({"cleanliness_score": 0.1}),
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rescoring_does_not_raise_a_second_alert(pool: PgPool) {
    let app = failing_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    let created = expect_json(submit_report(&app, &citizen, "Annapurna", BROWN_WATER).await, StatusCode::CREATED).await;
    let uri = format!("/api/v1/reports/{}/manual-score", created["data"]["id"]);

    for score in [0.2, 0.1, 0.15] {
        let response = post_json(&app, &uri, json!({"cleanliness_score": score}), Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let alerts = expect_json(get(&app, "/api/v1/alerts?limit=50", None).await, StatusCode::OK).await;
    let alerts = alerts["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["report_id"], created["data"]["id"]);
}

// ---------------------------------------------------------------------------
// Report digest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn summary_is_admin_only(pool: PgPool) {
    let app = build_test_app(pool);
    let citizen = citizen_token(&app).await;
    let response = get(&app, "/api/v1/reports/summary", Some(&citizen)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn summary_without_reports_skips_the_backend(pool: PgPool) {
    // A failing backend would surface as 503 if it were consulted.
    let app = failing_app(pool);
    let admin = admin_token(&app).await;
    let json = expect_json(get(&app, "/api/v1/reports/summary", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(json["data"]["summary"], NO_REPORTS_SUMMARY);
    assert_eq!(json["data"]["report_count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn summary_covers_recent_reports(pool: PgPool) {
    let app = build_test_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    submit_report(&app, &citizen, "Rau", CLEAR_WATER).await;
    submit_report(&app, &citizen, "Annapurna", BROWN_WATER).await;

    let json = expect_json(get(&app, "/api/v1/reports/summary", Some(&admin)).await, StatusCode::OK).await;
    let summary = json["data"]["summary"].as_str().unwrap();
    assert!(summary.starts_with("2 recent reports across 2 wards"), "{summary}");
    assert!(summary.contains("Unsafe water reported in Annapurna."), "{summary}");
    assert_eq!(json["data"]["report_count"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn summary_skips_rejected_reports(pool: PgPool) {
    let app = build_test_app_with(pool, Arc::new(Fixed(Ok(clear_water_result()))), 4);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    let first = expect_json(submit_report(&app, &citizen, "Rau", CLEAR_WATER).await, StatusCode::CREATED).await;
    submit_report(&app, &citizen, "Sukhliya", CLEAR_WATER).await;
    let uri = format!("/api/v1/reports/{}/review", first["data"]["id"]);
    post_json(&app, &uri, json!({"decision": "Rejected"}), Some(&admin)).await;

    let json = expect_json(get(&app, "/api/v1/reports/summary", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(json["data"]["summary"], FIXED_DIGEST);
    assert_eq!(json["data"]["report_count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn summary_backend_failure_is_reported_to_admins(pool: PgPool) {
    let app = failing_app(pool);
    let citizen = citizen_token(&app).await;
    let admin = admin_token(&app).await;
    submit_report(&app, &citizen, "Rau", CLEAR_WATER).await;

    let json = expect_json(
        get(&app, "/api/v1/reports/summary", Some(&admin)).await,
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
    assert_eq!(json["kind"], "backend_unavailable");
}
