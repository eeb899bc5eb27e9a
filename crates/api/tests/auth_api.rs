//! Integration tests for session login.

mod common;

use axum::http::StatusCode;
use common::{admin_token, build_test_app, citizen_token, expect_json, get, post_json, ADMIN_EMAIL};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn citizen_login_is_anonymous(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/auth/login", json!({"role": "citizen"}), None).await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["session"]["role"], "citizen");
    assert_eq!(json["session"]["subject"].as_str().unwrap().len(), 36);
    assert_eq!(json["expires_in"], 15 * 60);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn each_citizen_login_gets_a_new_subject(pool: PgPool) {
    let app = build_test_app(pool);
    let a = citizen_token(&app).await;
    let b = citizen_token(&app).await;
    let me_a = expect_json(get(&app, "/api/v1/auth/me", Some(&a)).await, StatusCode::OK).await;
    let me_b = expect_json(get(&app, "/api/v1/auth/me", Some(&b)).await, StatusCode::OK).await;
    assert_ne!(me_a["subject"], me_b["subject"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_with_valid_credentials(pool: PgPool) {
    let app = build_test_app(pool);
    let token = admin_token(&app).await;
    let me = expect_json(get(&app, "/api/v1/auth/me", Some(&token)).await, StatusCode::OK).await;
    assert_eq!(me["role"], "admin");
    assert_eq!(me["subject"], ADMIN_EMAIL);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_email_is_case_insensitive(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"role": "admin", "email": "Admin@Indore.gov.in", "password": common::ADMIN_PASSWORD}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"role": "admin", "email": ADMIN_EMAIL, "password": "guess"}),
        None,
    )
    .await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "Invalid email or password");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_login_requires_credentials(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/auth/login", json!({"role": "admin"}), None).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_email_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"role": "admin", "email": "not-an-email", "password": "x"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_role_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/auth/login", json!({"role": "superuser"}), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_valid_token(pool: PgPool) {
    let app = build_test_app(pool);
    let missing = expect_json(get(&app, "/api/v1/auth/me", None).await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(missing["code"], "UNAUTHORIZED");

    let garbage = get(&app, "/api/v1/auth/me", Some("not.a.jwt")).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}
