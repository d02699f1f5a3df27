//! Integration tests for the database seed run against a real schema.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, post_json};
use mediashelf_api::seed::{self, SeedAdmin, SeedSummary, CATALOG, GENRES, PLATFORMS};
use mediashelf_core::roles::Role;
use mediashelf_db::repositories::{GenreRepo, PlatformRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

fn seed_admin() -> SeedAdmin {
    SeedAdmin {
        email: "Owner@Mediashelf.test".to_string(),
        password: "seeded-admin-password".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeding_twice_changes_nothing_the_second_time(pool: PgPool) {
    let first = seed::run(&pool, &seed_admin()).await.unwrap();
    assert_eq!(
        first,
        SeedSummary {
            genres: GENRES.len(),
            platforms: PLATFORMS.len(),
            admin_created: true,
            media_inserted: CATALOG.len(),
            media_skipped: 0,
        }
    );

    let second = seed::run(&pool, &seed_admin()).await.unwrap();
    assert!(!second.admin_created);
    assert_eq!(second.media_inserted, 0);
    assert_eq!(second.media_skipped, CATALOG.len());

    assert_eq!(GenreRepo::list(&pool).await.unwrap().len(), GENRES.len());
    assert_eq!(PlatformRepo::list(&pool).await.unwrap().len(), PLATFORMS.len());
    let media_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(media_rows, CATALOG.len() as i64);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeded_admin_can_log_in(pool: PgPool) {
    seed::run(&pool, &seed_admin()).await.unwrap();
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": "owner@mediashelf.test", "password": "seeded-admin-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["role"], "ADMIN");
    assert_eq!(json["data"]["user"]["username"], seed::ADMIN_USERNAME);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn taken_admin_username_falls_back_to_a_free_one(pool: PgPool) {
    let squatter = create_user(&pool, "admin", Role::User).await;
    create_user(&pool, "admin2", Role::User).await;

    let summary = seed::run(&pool, &seed_admin()).await.unwrap();
    assert!(summary.admin_created);

    let admin = UserRepo::find_by_email(&pool, "owner@mediashelf.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.username, "admin3");
    assert_eq!(admin.role, "ADMIN");

    // The existing account keeps its role.
    let squatter = UserRepo::find_by_id(&pool, squatter.id).await.unwrap().unwrap();
    assert_eq!(squatter.role, "USER");

    let again = seed::run(&pool, &seed_admin()).await.unwrap();
    assert!(!again.admin_created);
}
