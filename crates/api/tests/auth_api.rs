//! HTTP-level integration tests for the `/api/auth` endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    assert_error, body_json, create_user, get, get_auth, post_json, post_json_auth,
    put_json_auth, TEST_PASSWORD,
};
use mediashelf_api::auth::jwt::hash_refresh_token;
use mediashelf_core::roles::Role;
use mediashelf_db::models::refresh_token::CreateRefreshToken;
use mediashelf_db::repositories::{RefreshTokenRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn register_body(username: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": "supersecret1",
        "displayName": "Test User",
    })
}

async fn login(app: axum::Router, identifier: &str, password: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": identifier, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn token_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_user_and_issues_tokens(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/auth/register",
        register_body("newbie", "Newbie@Example.com"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());
    assert_eq!(data["expiresIn"], 900);
    assert_eq!(data["user"]["username"], "newbie");
    assert_eq!(data["user"]["email"], "newbie@example.com");
    assert_eq!(data["user"]["role"], "USER");
    assert!(data["user"].get("passwordHash").is_none());

    let user_id = data["user"]["id"].as_i64().unwrap();
    assert_eq!(token_count(&pool, user_id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_email_is_409_and_creates_nothing(pool: PgPool) {
    create_user(&pool, "taken", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/auth/register",
        register_body("someone_else", "TAKEN@example.com"),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "EMAIL_EXISTS").await;

    let response = post_json(
        app,
        "/api/auth/register",
        register_body("taken", "fresh@example.com"),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "USERNAME_EXISTS").await;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_invalid_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let bad_username = json!({ "username": "no spaces!", "email": "a@b.com", "password": "longenough" });
    let response = post_json(app.clone(), "/api/auth/register", bad_username).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let short_password = json!({ "username": "valid_name", "email": "a@b.com", "password": "short" });
    let response = post_json(app.clone(), "/api/auth/register", short_password).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let bad_email = json!({ "username": "valid_name", "email": "not-an-email", "password": "longenough" });
    let response = post_json(app, "/api/auth/register", bad_email).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_accepts_email_or_username(pool: PgPool) {
    let user = create_user(&pool, "reader", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let by_email = login(app.clone(), "reader@example.com", TEST_PASSWORD).await;
    assert_eq!(by_email["data"]["user"]["id"], user.id);
    assert!(by_email["data"]["accessToken"].is_string());

    let by_username = login(app, "reader", TEST_PASSWORD).await;
    assert_eq!(by_username["data"]["user"]["id"], user.id);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_wrong_password_is_401_and_issues_no_tokens(pool: PgPool) {
    let user = create_user(&pool, "careful", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": "careful@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS").await;
    assert_eq!(token_count(&pool, user.id).await, 0);

    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS").await;
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_issues_new_access_token_without_rotation(pool: PgPool) {
    create_user(&pool, "refresher", Role::User).await;
    let app = common::build_test_app(pool);

    let json = login(app.clone(), "refresher", TEST_PASSWORD).await;
    let refresh_token = json["data"]["refreshToken"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = post_json(
            app.clone(),
            "/api/auth/refresh-token",
            json!({ "refreshToken": refresh_token }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["data"]["accessToken"].is_string());
        assert_eq!(json["data"]["expiresIn"], 900);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_with_unknown_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/auth/refresh-token",
        json!({ "refreshToken": "does-not-exist" }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_REFRESH_TOKEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_refresh_token_is_rejected_and_deleted(pool: PgPool) {
    let user = create_user(&pool, "stale", Role::User).await;
    let plaintext = "expired-token-plaintext";
    RefreshTokenRepo::create(
        &pool,
        &CreateRefreshToken {
            user_id: user.id,
            token_hash: hash_refresh_token(plaintext),
            expires_at: Utc::now() - Duration::minutes(1),
        },
    )
    .await
    .unwrap();
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/auth/refresh-token",
        json!({ "refreshToken": plaintext }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_EXPIRED").await;
    assert_eq!(token_count(&pool, user.id).await, 0);

    // Second attempt: the row is gone.
    let response = post_json(
        app,
        "/api/auth/refresh-token",
        json!({ "refreshToken": plaintext }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_REFRESH_TOKEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_token_and_is_idempotent(pool: PgPool) {
    let user = create_user(&pool, "leaver", Role::User).await;
    let app = common::build_test_app(pool.clone());

    let json = login(app.clone(), "leaver", TEST_PASSWORD).await;
    let refresh_token = json["data"]["refreshToken"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = post_json(
            app.clone(),
            "/api/auth/logout",
            json!({ "refreshToken": refresh_token }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(token_count(&pool, user.id).await, 0);

    let response = post_json(
        app,
        "/api/auth/refresh-token",
        json!({ "refreshToken": refresh_token }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_REFRESH_TOKEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_all_devices_revokes_every_token(pool: PgPool) {
    let user = create_user(&pool, "multi", Role::User).await;
    let app = common::build_test_app(pool.clone());

    login(app.clone(), "multi", TEST_PASSWORD).await;
    let second = login(app.clone(), "multi", TEST_PASSWORD).await;
    assert_eq!(token_count(&pool, user.id).await, 2);

    let access = second["data"]["accessToken"].as_str().unwrap();
    let response = post_json_auth(
        app,
        "/api/auth/logout",
        json!({ "allDevices": true }),
        access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(token_count(&pool, user.id).await, 0);
}

// ---------------------------------------------------------------------------
// Current account / password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_requires_token_and_returns_counts(pool: PgPool) {
    let (user, token) = common::user_with_token(&pool, "selfie", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/auth/me").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = get_auth(app.clone(), "/api/auth/me", "garbage.token.value").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = get_auth(app, "/api/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["email"], "selfie@example.com");
    assert_eq!(json["data"]["ratingsCount"], 0);
    assert_eq!(json["data"]["followersCount"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_password_verifies_current_and_revokes_tokens(pool: PgPool) {
    let user = create_user(&pool, "rotator", Role::User).await;
    let app = common::build_test_app(pool.clone());
    let json = login(app.clone(), "rotator", TEST_PASSWORD).await;
    let access = json["data"]["accessToken"].as_str().unwrap().to_string();

    let response = put_json_auth(
        app.clone(),
        "/api/auth/password",
        json!({ "currentPassword": "not-it", "newPassword": "brand-new-pass" }),
        &access,
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS").await;

    let response = put_json_auth(
        app.clone(),
        "/api/auth/password",
        json!({ "currentPassword": TEST_PASSWORD, "newPassword": "brand-new-pass" }),
        &access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(token_count(&pool, user.id).await, 0);

    login(app, "rotator", "brand-new-pass").await;
}
