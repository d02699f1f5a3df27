//! HTTP-level integration tests for the `/api/lists` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, create_movie, delete_auth, get, get_auth, post_json_auth,
    put_json_auth, user_with_token,
};
use mediashelf_core::roles::Role;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_list(app: &axum::Router, token: &str, body: Value) -> i64 {
    let response = post_json_auth(app.clone(), "/api/lists", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn add_item(app: &axum::Router, token: &str, list_id: i64, media_id: i64) -> StatusCode {
    post_json_auth(
        app.clone(),
        &format!("/api/lists/{list_id}/items"),
        json!({ "mediaId": media_id }),
        token,
    )
    .await
    .status()
}

fn item_media_ids(json: &Value) -> Vec<i64> {
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["mediaId"].as_i64().unwrap())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lists_default_public_and_names_are_unique_per_owner(pool: PgPool) {
    let (alice, alice_token) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob_token) = user_with_token(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/lists",
        json!({ "name": "Watch later" }),
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["isPublic"], true);
    assert_eq!(json["data"]["userId"], alice.id);
    assert_eq!(json["data"]["itemCount"], 0);

    let response = post_json_auth(
        app.clone(),
        "/api/lists",
        json!({ "name": "Watch later" }),
        &alice_token,
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "LIST_EXISTS").await;

    // Another user may reuse the name.
    create_list(&app, &bob_token, json!({ "name": "Watch later" })).await;

    let response = post_json_auth(app, "/api/lists", json!({ "name": "  " }), &alice_token).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn items_append_in_order_and_reject_duplicates(pool: PgPool) {
    let (_, moderator) = user_with_token(&pool, "mod", Role::Moderator).await;
    let (_, alice) = user_with_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);
    let first = create_movie(&app, &moderator, "First").await;
    let second = create_movie(&app, &moderator, "Second").await;
    let list_id = create_list(&app, &alice, json!({ "name": "Queue" })).await;

    assert_eq!(add_item(&app, &alice, list_id, first).await, StatusCode::CREATED);
    assert_eq!(add_item(&app, &alice, list_id, second).await, StatusCode::CREATED);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/lists/{list_id}/items"),
        json!({ "mediaId": first }),
        &alice,
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "LIST_ITEM_EXISTS").await;

    assert_eq!(add_item(&app, &alice, list_id, 777_777).await, StatusCode::NOT_FOUND);

    let json = body_json(get(app, &format!("/api/lists/{list_id}")).await).await;
    assert_eq!(item_media_ids(&json), [first, second]);
    assert_eq!(json["data"]["items"][0]["position"], 1);
    assert_eq!(json["data"]["items"][1]["position"], 2);
    assert_eq!(json["data"]["itemCount"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reorder_requires_exact_permutation(pool: PgPool) {
    let (_, moderator) = user_with_token(&pool, "mod", Role::Moderator).await;
    let (_, alice) = user_with_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);
    let a = create_movie(&app, &moderator, "A").await;
    let b = create_movie(&app, &moderator, "B").await;
    let c = create_movie(&app, &moderator, "C").await;
    let list_id = create_list(&app, &alice, json!({ "name": "Ranked" })).await;
    for media_id in [a, b, c] {
        add_item(&app, &alice, list_id, media_id).await;
    }
    let uri = format!("/api/lists/{list_id}/items/order");

    for bad in [json!([a, b]), json!([a, a, b]), json!([a, b, 999_999])] {
        let response = put_json_auth(app.clone(), &uri, json!({ "mediaIds": bad }), &alice).await;
        assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    }

    let response = put_json_auth(app.clone(), &uri, json!({ "mediaIds": [c, a, b] }), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ordered: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["mediaId"].as_i64().unwrap())
        .collect();
    assert_eq!(ordered, [c, a, b]);

    // Removing an item closes the gap.
    let response = delete_auth(app.clone(), &format!("/api/lists/{list_id}/items/{a}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get(app, &format!("/api/lists/{list_id}")).await).await;
    assert_eq!(item_media_ids(&json), [c, b]);
    assert_eq!(json["data"]["items"][1]["position"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn private_list_is_hidden_from_others(pool: PgPool) {
    let (_, alice) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob) = user_with_token(&pool, "bob", Role::User).await;
    let (_, admin) = user_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);
    let list_id = create_list(&app, &alice, json!({ "name": "Secret", "isPublic": false })).await;
    let uri = format!("/api/lists/{list_id}");

    let response = get(app.clone(), &uri).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = get_auth(app.clone(), &uri, &bob).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = get_auth(app.clone(), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_or_admin_modifies_a_public_list(pool: PgPool) {
    let (_, alice) = user_with_token(&pool, "alice", Role::User).await;
    let (_, bob) = user_with_token(&pool, "bob", Role::User).await;
    let (_, moderator) = user_with_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);
    let list_id = create_list(&app, &alice, json!({ "name": "Shared" })).await;
    let uri = format!("/api/lists/{list_id}");

    let response = put_json_auth(app.clone(), &uri, json!({ "name": "Mine now" }), &bob).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response = delete_auth(app.clone(), &uri, &moderator).await;
    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_DENIED").await;

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "name": "Shared favourites", "isPublic": false }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Shared favourites");
    assert_eq!(json["data"]["isPublic"], false);

    let json = body_json(get_auth(app.clone(), "/api/lists", &alice).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(app.clone(), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app, &uri, &alice).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
