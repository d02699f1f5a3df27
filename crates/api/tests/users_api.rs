//! HTTP-level integration tests for the `/api/users` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, delete_auth, get, patch_json_auth, post_json_auth, send,
    user_with_token,
};
use mediashelf_core::roles::Role;
use serde_json::json;
use sqlx::PgPool;

async fn follow(app: &axum::Router, token: &str, target: i64) -> axum::response::Response {
    send(
        app.clone(),
        axum::http::Method::POST,
        &format!("/api/users/{target}/follow"),
        Some(token),
        None,
    )
    .await
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_profile_hides_email_and_includes_counts(pool: PgPool) {
    let (user, _) = user_with_token(&pool, "profiled", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), &format!("/api/users/{}", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "profiled");
    assert!(json["data"].get("email").is_none());
    assert_eq!(json["data"]["followersCount"], 0);

    let response = get(app, "/api/users/424242").await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_users_supports_search(pool: PgPool) {
    user_with_token(&pool, "marvin", Role::User).await;
    user_with_token(&pool, "trillian", Role::User).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/api/users").await).await;
    assert_eq!(json["meta"]["pagination"]["total"], 2);

    let json = body_json(get(app, "/api/users?search=TRIL").await).await;
    assert_eq!(json["meta"]["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["username"], "trillian");
}

// ---------------------------------------------------------------------------
// Account management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admin_creates_users_with_roles(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", Role::Admin).await;
    let (_, user) = user_with_token(&pool, "pleb", Role::User).await;
    let app = common::build_test_app(pool);
    let body = json!({
        "username": "curator",
        "email": "curator@example.com",
        "password": "curator-password",
        "role": "MODERATOR",
    });

    let response = post_json_auth(app.clone(), "/api/users", body.clone(), &user).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response = post_json_auth(app.clone(), "/api/users", body.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "MODERATOR");

    let response = post_json_auth(app, "/api/users", body, &admin).await;
    assert_error(response, StatusCode::CONFLICT, "EMAIL_EXISTS").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_updates_are_self_or_admin_and_roles_admin_only(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob_token) = user_with_token(&pool, "bob", Role::User).await;
    let (_, admin) = user_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/users/{}", alice.id);

    let response = patch_json_auth(app.clone(), &uri, json!({ "bio": "hi" }), &bob_token).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response =
        patch_json_auth(app.clone(), &uri, json!({ "role": "ADMIN" }), &alice_token).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response = patch_json_auth(
        app.clone(),
        &uri,
        json!({ "bio": "Reads a lot", "displayName": "Alice" }),
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["bio"], "Reads a lot");
    assert_eq!(json["data"]["displayName"], "Alice");
    assert_eq!(json["data"]["role"], "USER");

    let response =
        patch_json_auth(app.clone(), &uri, json!({ "email": "bob@example.com" }), &alice_token)
            .await;
    assert_error(response, StatusCode::CONFLICT, "EMAIL_EXISTS").await;

    let response = patch_json_auth(app, &uri, json!({ "role": "MODERATOR" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "MODERATOR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_can_delete_own_account(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob_token) = user_with_token(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/users/{}", alice.id);

    let response = delete_auth(app.clone(), &uri, &bob_token).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response = delete_auth(app.clone(), &uri, &alice_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, &uri).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Follow graph
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn follow_and_unfollow(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let (bob, _) = user_with_token(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);

    let response = follow(&app, &alice_token, bob.id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = follow(&app, &alice_token, bob.id).await;
    assert_error(response, StatusCode::CONFLICT, "ALREADY_FOLLOWING").await;

    let json = body_json(get(app.clone(), &format!("/api/users/{}/followers", bob.id)).await).await;
    assert_eq!(json["meta"]["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["userId"], alice.id);

    let json = body_json(get(app.clone(), &format!("/api/users/{}/following", alice.id)).await).await;
    assert_eq!(json["data"][0]["username"], "bob");

    let json = body_json(get(app.clone(), &format!("/api/users/{}", bob.id)).await).await;
    assert_eq!(json["data"]["followersCount"], 1);

    let uri = format!("/api/users/{}/follow", bob.id);
    let response = delete_auth(app.clone(), &uri, &alice_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app, &uri, &alice_token).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cannot_follow_self_or_missing_user(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let response = follow(&app, &alice_token, alice.id).await;
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;

    let response = follow(&app, &alice_token, 987_654).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn private_lists_are_listed_only_for_owner(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob_token) = user_with_token(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);

    for (name, is_public) in [("Favorites", true), ("Guilty pleasures", false)] {
        let response = post_json_auth(
            app.clone(),
            "/api/lists",
            json!({ "name": name, "isPublic": is_public }),
            &alice_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let uri = format!("/api/users/{}/lists", alice.id);

    let json = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let json = body_json(common::get_auth(app.clone(), &uri, &bob_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let json = body_json(common::get_auth(app, &uri, &alice_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
