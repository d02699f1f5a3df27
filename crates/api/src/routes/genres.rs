//! Route definitions for the `/genres` and `/platforms` taxonomies.

use axum::routing::get;
use axum::Router;

use crate::handlers::genres;
use crate::state::AppState;

/// Routes mounted at `/genres`.
pub fn genre_router() -> Router<AppState> {
    Router::new().route("/", get(genres::list_genres).post(genres::create_genre))
}

/// Routes mounted at `/platforms`.
pub fn platform_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(genres::list_platforms).post(genres::create_platform),
    )
}
