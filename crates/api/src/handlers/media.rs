//! Handlers for the `/media` resource.
//!
//! Reads are public and served through the optional Redis cache. Writes
//! require an elevated role to create, and creator-or-elevated to modify.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use mediashelf_core::error::CoreError;
use mediashelf_core::media::{
    validate_attributes, validate_title, MediaAttributes, MediaSort, MediaType, SortOrder,
};
use mediashelf_core::roles::can_modify;
use mediashelf_core::types::DbId;
use mediashelf_db::models::media::{CreateMedia, Media, MediaFilter, UpdateMedia};
use mediashelf_db::models::rating::{Rating, RatingFilter};
use mediashelf_db::models::review::{Review, ReviewFilter};
use mediashelf_db::repositories::{MediaRepo, RatingRepo, ReviewRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_found;
use crate::cache::{media_detail_key, media_list_key};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireModerator;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// `GET /media` query string.
#[derive(Debug, Default, Deserialize)]
pub struct MediaListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Platform slug.
    pub platform: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: MediaSort,
    #[serde(default)]
    pub order: SortOrder,
}

/// Request body for `POST /media`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    #[serde(alias = "type")]
    pub media_type: String,
    pub title: String,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[validate(url(message = "must be a valid URL"))]
    pub cover_image_url: Option<String>,
    #[serde(flatten)]
    pub attributes: MediaAttributes,
    #[serde(default)]
    pub genre_ids: Vec<DbId>,
    #[serde(default)]
    pub platform_ids: Vec<DbId>,
}

/// Request body for `PUT /media/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaRequest {
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[validate(url(message = "must be a valid URL"))]
    pub cover_image_url: Option<String>,
    #[serde(flatten)]
    pub attributes: MediaAttributes,
    pub genre_ids: Option<Vec<DbId>>,
    pub platform_ids: Option<Vec<DbId>>,
}

/// Cached form of a listing page.
#[derive(Debug, Serialize, Deserialize)]
struct CachedPage {
    items: Vec<Media>,
    total: i64,
}

impl MediaListParams {
    fn filter(&self) -> AppResult<MediaFilter> {
        let media_type = match non_blank(&self.media_type) {
            Some(raw) => Some(raw.parse::<MediaType>()?.as_str().to_string()),
            None => None,
        };
        Ok(MediaFilter {
            media_type,
            genre_slug: non_blank(&self.genre).map(str::to_lowercase),
            platform_slug: non_blank(&self.platform).map(str::to_lowercase),
            search: non_blank(&self.search).map(str::to_string),
            sort: self.sort,
            order: self.order,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Every parameter that affects a listing, in a fixed order.
fn canonical_query(filter: &MediaFilter, page: i64, limit: i64) -> String {
    format!(
        "type={}&genre={}&platform={}&search={}&sort={:?}&order={:?}&page={page}&limit={limit}",
        filter.media_type.as_deref().unwrap_or(""),
        filter.genre_slug.as_deref().unwrap_or(""),
        filter.platform_slug.as_deref().unwrap_or(""),
        filter.search.as_deref().unwrap_or(""),
        filter.sort,
        filter.order,
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/media
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MediaListParams>,
) -> AppResult<Json<ApiResponse<Vec<Media>>>> {
    let filter = params.filter()?;
    let page = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .page_request();

    let key = media_list_key(&canonical_query(&filter, page.page, page.limit));
    if let Some(cached) = state.cache.get::<CachedPage>(&key).await {
        return Ok(Json(ApiResponse::paginated(cached.items, page, cached.total)));
    }

    let (items, total) = MediaRepo::list(&state.pool, &filter, page).await?;
    let cached = CachedPage { items, total };
    state.cache.set(&key, &cached).await;

    Ok(Json(ApiResponse::paginated(cached.items, page, total)))
}

/// GET /api/media/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Media>>> {
    let key = media_detail_key(id);
    if let Some(media) = state.cache.get::<Media>(&key).await {
        return Ok(Json(ApiResponse::ok(media)));
    }

    let media = MediaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Media", id))?;
    state.cache.set(&key, &media).await;

    Ok(Json(ApiResponse::ok(media)))
}

/// POST /api/media
pub async fn create(
    State(state): State<AppState>,
    RequireModerator(auth): RequireModerator,
    AppJson(input): AppJson<CreateMediaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Media>>)> {
    input.validate()?;
    let media_type: MediaType = input.media_type.parse()?;
    validate_title(&input.title)?;
    validate_attributes(media_type, &input.attributes)?;

    let create = CreateMedia {
        media_type: media_type.as_str().to_string(),
        title: input.title.trim().to_string(),
        description: input.description,
        release_date: input.release_date,
        cover_image_url: input.cover_image_url,
        attributes: input.attributes,
        genre_ids: input.genre_ids,
        platform_ids: input.platform_ids,
    };
    let media = MediaRepo::create(&state.pool, &create, Some(auth.user_id)).await?;
    state.cache.invalidate_media().await;

    tracing::info!(
        media_id = media.id,
        media_type = %media.media_type,
        user_id = auth.user_id,
        "Media created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(media).with_message("Media created")),
    ))
}

/// PUT /api/media/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateMediaRequest>,
) -> AppResult<Json<ApiResponse<Media>>> {
    input.validate()?;
    ensure_can_modify(&state, &auth, id).await?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let media_type: MediaType = MediaRepo::find_type(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Media", id))?
        .parse()?;
    validate_attributes(media_type, &input.attributes)?;

    let update = UpdateMedia {
        title: input.title.map(|t| t.trim().to_string()),
        description: input.description,
        release_date: input.release_date,
        cover_image_url: input.cover_image_url,
        attributes: input.attributes,
        genre_ids: input.genre_ids,
        platform_ids: input.platform_ids,
    };
    let media = MediaRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| not_found("Media", id))?;
    state.cache.invalidate_media().await;

    tracing::info!(media_id = id, user_id = auth.user_id, "Media updated");

    Ok(Json(ApiResponse::ok(media).with_message("Media updated")))
}

/// DELETE /api/media/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    ensure_can_modify(&state, &auth, id).await?;

    if !MediaRepo::delete(&state.pool, id).await? {
        return Err(not_found("Media", id));
    }
    state.cache.invalidate_media().await;

    tracing::info!(media_id = id, user_id = auth.user_id, "Media deleted");

    Ok(Json(ApiResponse::message("Media deleted")))
}

/// GET /api/media/{id}/ratings
pub async fn ratings(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<Rating>>>> {
    ensure_exists(&state, id).await?;
    let page = params.page_request();
    let filter = RatingFilter {
        media_id: Some(id),
        user_id: None,
    };
    let (ratings, total) = RatingRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(ratings, page, total)))
}

/// GET /api/media/{id}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    ensure_exists(&state, id).await?;
    let page = params.page_request();
    let filter = ReviewFilter {
        media_id: Some(id),
        user_id: None,
    };
    let (reviews, total) = ReviewRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(reviews, page, total)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_exists(state: &AppState, id: DbId) -> AppResult<()> {
    MediaRepo::find_title(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found("Media", id))
}

/// 404 when the media is missing, 403 unless the caller created it or holds
/// an elevated role.
async fn ensure_can_modify(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<()> {
    let owner = MediaRepo::find_owner(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Media", id))?;
    if !can_modify(auth.user_id, auth.role, owner) {
        tracing::info!(media_id = id, user_id = auth.user_id, "Media modification denied");
        return Err(CoreError::permission_denied().into());
    }
    Ok(())
}
