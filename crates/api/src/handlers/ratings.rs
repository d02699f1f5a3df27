//! Handlers for the `/ratings` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::rating::validate_score;
use mediashelf_core::roles::can_modify;
use mediashelf_core::types::DbId;
use mediashelf_db::models::rating::{Rating, RatingFilter};
use mediashelf_db::repositories::{rating_repo, MediaRepo, RatingRepo};
use serde::Deserialize;

use super::not_found;
use crate::error::{map_unique, AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::ActivityParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /ratings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub media_id: DbId,
    pub score: i16,
}

/// Request body for `PUT /ratings/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub score: i16,
}

fn rating_exists() -> AppError {
    AppError::Core(CoreError::conflict(
        codes::RATING_EXISTS,
        "You have already rated this media",
    ))
}

/// GET /api/ratings
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ActivityParams>,
) -> AppResult<Json<ApiResponse<Vec<Rating>>>> {
    let page = params.page_request();
    let filter = RatingFilter {
        media_id: params.media_id,
        user_id: params.user_id,
    };
    let (ratings, total) = RatingRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(ratings, page, total)))
}

/// GET /api/ratings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Rating>>> {
    let rating = RatingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Rating", id))?;
    Ok(Json(ApiResponse::ok(rating)))
}

/// POST /api/ratings
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Rating>>)> {
    validate_score(input.score)?;

    if MediaRepo::find_title(&state.pool, input.media_id).await?.is_none() {
        return Err(not_found("Media", input.media_id));
    }
    if RatingRepo::find_by_user_and_media(&state.pool, auth.user_id, input.media_id)
        .await?
        .is_some()
    {
        return Err(rating_exists());
    }

    let rating = RatingRepo::create(&state.pool, auth.user_id, input.media_id, input.score)
        .await
        .map_err(map_unique(
            rating_repo::UNIQUE_USER_MEDIA,
            codes::RATING_EXISTS,
            "You have already rated this media",
        ))?;
    state.cache.invalidate_media().await;

    tracing::info!(
        rating_id = rating.id,
        media_id = rating.media_id,
        user_id = auth.user_id,
        score = rating.score,
        "Rating created",
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(rating))))
}

/// PUT /api/ratings/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateRatingRequest>,
) -> AppResult<Json<ApiResponse<Rating>>> {
    validate_score(input.score)?;
    ensure_can_modify(&state, &auth, id).await?;

    let rating = RatingRepo::update_score(&state.pool, id, input.score)
        .await?
        .ok_or_else(|| not_found("Rating", id))?;
    state.cache.invalidate_media().await;

    tracing::info!(rating_id = id, user_id = auth.user_id, score = input.score, "Rating updated");

    Ok(Json(ApiResponse::ok(rating)))
}

/// DELETE /api/ratings/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    ensure_can_modify(&state, &auth, id).await?;

    if !RatingRepo::delete(&state.pool, id).await? {
        return Err(not_found("Rating", id));
    }
    state.cache.invalidate_media().await;

    tracing::info!(rating_id = id, user_id = auth.user_id, "Rating deleted");

    Ok(Json(ApiResponse::message("Rating deleted")))
}

async fn ensure_can_modify(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<()> {
    let rating = RatingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Rating", id))?;
    if !can_modify(auth.user_id, auth.role, Some(rating.user_id)) {
        return Err(CoreError::permission_denied().into());
    }
    Ok(())
}
