/// End-to-end tests for the user endpoints
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test user_api_tests -- --ignored --test-threads=1

mod common;

use axum::http::StatusCode;
use common::{unique_email, TestContext};
use recipe_shared::models::{token::AuthToken, user::User};
use serde_json::json;

#[tokio::test]
#[ignore]
async fn test_create_user_success() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("create");

    let (status, body) = ctx
        .post(
            "/user/create",
            json!({ "email": email, "password": "883214", "name": "test name" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert_eq!(body["name"], "test name");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert!(user.check_password("883214").unwrap());

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_create_user_normalizes_email() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("Mixed.Case");

    let (status, body) = ctx
        .post(
            "/user/create",
            json!({ "email": email.to_uppercase(), "password": "883214" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email.to_lowercase());

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_create_user_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("dup");
    let payload = json!({ "email": email, "password": "883214", "name": "test name" });

    let (status, _) = ctx.post("/user/create", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.post("/user/create", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "email");

    let (matching,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(matching, 1);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_create_user_short_password_persists_nothing() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("short");

    let (status, _) = ctx
        .post(
            "/user/create",
            json!({ "email": email, "password": "3214", "name": "test name" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!User::exists_with_email(&ctx.db, &email).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_create_token_for_user() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("pako");

    User::create_user(&ctx.db, Some(email.as_str()), "876543210", Default::default())
        .await
        .unwrap();

    let (status, body) = ctx
        .post(
            "/user/token",
            json!({ "email": email, "password": "876543210" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"].as_str().unwrap().len(), 40);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_create_token_wrong_password() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("pako");

    User::create_user(&ctx.db, Some(email.as_str()), "876543210", Default::default())
        .await
        .unwrap();

    let (status, body) = ctx
        .post("/user/token", json!({ "email": email, "password": "98765" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("token").is_none());
    assert_eq!(body["details"][0]["field"], "non_field_errors");

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_create_token_no_user() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .post(
            "/user/token",
            json!({ "email": unique_email("ghost"), "password": "876543210" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("token").is_none());
}

#[tokio::test]
#[ignore]
async fn test_create_token_inactive_user() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("inactive");

    User::create_user(
        &ctx.db,
        Some(email.as_str()),
        "876543210",
        recipe_shared::models::user::ExtraFields {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (status, body) = ctx
        .post(
            "/user/token",
            json!({ "email": email, "password": "876543210" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("token").is_none());

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_token_authenticates_me() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("me");

    let token = ctx.signup(&email, "883214").await;

    let (status, body) = ctx.get("/user/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
    assert_eq!(body["name"], "Test");

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_new_token_replaces_previous() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("rotate");

    let first = ctx.signup(&email, "883214").await;

    let (status, body) = ctx
        .post("/user/token", json!({ "email": email, "password": "883214" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["token"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    let (status, _) = ctx.get("/user/me", &first).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/user/me", &second).await;
    assert_eq!(status, StatusCode::OK);

    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert!(AuthToken::revoke(&ctx.db, user.id).await.unwrap());

    let (status, _) = ctx.get("/user/me", &second).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
#[ignore]
async fn test_health_with_database() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = common::send(&ctx.app, axum::http::Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
