//! Integration tests for per-client rate limiting through the full router.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{assert_error, get, post_json};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

fn limited_app(pool: PgPool, max_requests: u32, auth_max_requests: u32) -> axum::Router {
    let mut config = common::test_config();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.auth_max_requests = auth_max_requests;
    common::build_test_app_with(pool, config)
}

async fn get_from(app: axum::Router, uri: &str, client: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn auth_budget_is_enforced_with_retry_after(pool: PgPool) {
    let app = limited_app(pool, 100, 2);
    let body = json!({ "email": "nobody@example.com", "password": "whatever1" });

    for _ in 0..2 {
        let response = post_json(app.clone(), "/api/auth/login", body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_json(app.clone(), "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("retry-after header");
    assert!(retry_after >= 1);
    assert_error(response, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;

    // The general budget is separate.
    let response = get(app, "/api/genres").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clients_are_limited_independently(pool: PgPool) {
    let app = limited_app(pool, 1, 100);

    assert_eq!(
        get_from(app.clone(), "/api/genres", "10.0.0.1").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        get_from(app.clone(), "/api/genres", "10.0.0.1").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        get_from(app, "/api/genres", "10.0.0.2").await.status(),
        StatusCode::OK
    );
}
