//! Handlers for the `/reviews` resource.
//!
//! Publishing a review fans out a `NEW_REVIEW` notification to every
//! follower of the author.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::notifications::{new_review_text, NotificationKind};
use mediashelf_core::review::{validate_content, validate_title};
use mediashelf_core::roles::can_modify;
use mediashelf_core::types::DbId;
use mediashelf_db::models::notification::CreateNotification;
use mediashelf_db::models::review::{CreateReview, Review, ReviewFilter, UpdateReview};
use mediashelf_db::repositories::{review_repo, MediaRepo, NotificationRepo, ReviewRepo};
use serde::Deserialize;
use serde_json::json;

use super::not_found;
use crate::error::{map_unique, AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::ActivityParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /reviews`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub media_id: DbId,
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub contains_spoilers: bool,
}

/// Request body for `PUT /reviews/{id}`.
///
/// An absent `title` leaves it unchanged; a blank one removes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub contains_spoilers: Option<bool>,
}

fn review_exists() -> AppError {
    AppError::Core(CoreError::conflict(
        codes::REVIEW_EXISTS,
        "You have already reviewed this media",
    ))
}

/// Trim an optional title, treating blank as absent.
fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// GET /api/reviews
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ActivityParams>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    let page = params.page_request();
    let filter = ReviewFilter {
        media_id: params.media_id,
        user_id: params.user_id,
    };
    let (reviews, total) = ReviewRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(reviews, page, total)))
}

/// GET /api/reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Review", id))?;
    Ok(Json(ApiResponse::ok(review)))
}

/// POST /api/reviews
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    validate_content(&input.content)?;
    let title = clean_title(input.title);
    validate_title(title.as_deref())?;

    if MediaRepo::find_title(&state.pool, input.media_id).await?.is_none() {
        return Err(not_found("Media", input.media_id));
    }
    if ReviewRepo::find_by_user_and_media(&state.pool, auth.user_id, input.media_id)
        .await?
        .is_some()
    {
        return Err(review_exists());
    }

    let create = CreateReview {
        media_id: input.media_id,
        title,
        content: input.content.trim().to_string(),
        contains_spoilers: input.contains_spoilers,
    };
    let review = ReviewRepo::create(&state.pool, auth.user_id, &create)
        .await
        .map_err(map_unique(
            review_repo::UNIQUE_USER_MEDIA,
            codes::REVIEW_EXISTS,
            "You have already reviewed this media",
        ))?;
    state.cache.invalidate_media().await;

    tracing::info!(
        review_id = review.id,
        media_id = review.media_id,
        user_id = auth.user_id,
        "Review created",
    );

    notify_followers(&state, &review).await;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// PUT /api/reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    if let Some(content) = &input.content {
        validate_content(content)?;
    }
    let title = input.title.map(|t| clean_title(Some(t)));
    validate_title(title.as_ref().and_then(|t| t.as_deref()))?;
    ensure_can_modify(&state, &auth, id).await?;

    let update = UpdateReview {
        title,
        content: input.content.map(|c| c.trim().to_string()),
        contains_spoilers: input.contains_spoilers,
    };
    let review = ReviewRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| not_found("Review", id))?;
    state.cache.invalidate_media().await;

    tracing::info!(review_id = id, user_id = auth.user_id, "Review updated");

    Ok(Json(ApiResponse::ok(review)))
}

/// DELETE /api/reviews/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    ensure_can_modify(&state, &auth, id).await?;

    if !ReviewRepo::delete(&state.pool, id).await? {
        return Err(not_found("Review", id));
    }
    state.cache.invalidate_media().await;

    tracing::info!(review_id = id, user_id = auth.user_id, "Review deleted");

    Ok(Json(ApiResponse::message("Review deleted")))
}

async fn ensure_can_modify(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<()> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Review", id))?;
    if !can_modify(auth.user_id, auth.role, Some(review.user_id)) {
        return Err(CoreError::permission_denied().into());
    }
    Ok(())
}

/// Best-effort fan-out; the review is already committed, so failures are
/// only logged.
async fn notify_followers(state: &AppState, review: &Review) {
    let (title, message) = new_review_text(&review.username, &review.media_title);
    let notification = CreateNotification {
        kind: NotificationKind::NewReview.as_str().to_string(),
        title,
        message,
        actor_id: Some(review.user_id),
        media_id: Some(review.media_id),
        data: json!({ "reviewId": review.id }),
    };

    match NotificationRepo::create_for_followers(&state.pool, review.user_id, &notification).await
    {
        Ok(count) => {
            tracing::debug!(review_id = review.id, recipients = count, "Review notifications sent")
        }
        Err(e) => tracing::warn!(
            review_id = review.id,
            error = %e,
            "Failed to notify followers of new review"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_dropped() {
        assert_eq!(clean_title(Some("   ".into())), None);
        assert_eq!(clean_title(Some(" Great ".into())), Some("Great".into()));
        assert_eq!(clean_title(None), None);
    }
}
