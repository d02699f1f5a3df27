//! Handlers for the `/lists` resource: user-curated, ordered media lists.
//!
//! Only the owner or an admin may see a private list or modify any list.
//! Someone else asking for a private list gets a 404, so its existence is
//! not revealed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::lists::validate_list_name;
use mediashelf_core::types::DbId;
use mediashelf_db::models::list::{CreateMediaList, MediaList, MediaListItem, UpdateMediaList};
use mediashelf_db::repositories::list_repo::ReorderOutcome;
use mediashelf_db::repositories::{list_repo, ListRepo, MediaRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_found;
use crate::error::{map_unique, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub media_id: DbId,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub media_ids: Vec<DbId>,
}

/// A list with its items in position order.
#[derive(Debug, Serialize)]
pub struct ListDetail {
    #[serde(flatten)]
    pub list: MediaList,
    pub items: Vec<MediaListItem>,
}

/// Path parameters for `/lists/{id}/items/{media_id}`.
#[derive(Debug, Deserialize)]
pub struct ListItemPath {
    pub id: DbId,
    pub media_id: DbId,
}

// ---------------------------------------------------------------------------
// Access rules
// ---------------------------------------------------------------------------

fn is_owner_or_admin(auth: &AuthUser, list: &MediaList) -> bool {
    list.user_id == auth.user_id || auth.is_admin()
}

fn can_view(auth: Option<&AuthUser>, list: &MediaList) -> bool {
    list.is_public || auth.is_some_and(|user| is_owner_or_admin(user, list))
}

/// Load a list the caller may see.
async fn load_visible(state: &AppState, auth: Option<&AuthUser>, id: DbId) -> AppResult<MediaList> {
    let list = ListRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("List", id))?;
    if !can_view(auth, &list) {
        return Err(not_found("List", id));
    }
    Ok(list)
}

/// Load a list the caller may modify.
async fn load_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<MediaList> {
    let list = load_visible(state, Some(auth), id).await?;
    if !is_owner_or_admin(auth, &list) {
        return Err(CoreError::permission_denied().into());
    }
    Ok(list)
}

fn list_exists() -> AppError {
    AppError::Core(CoreError::conflict(
        codes::LIST_EXISTS,
        "You already have a list with this name",
    ))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// GET /api/lists
///
/// The caller's own lists, private ones included.
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<MediaList>>>> {
    let lists = ListRepo::list_for_user(&state.pool, auth.user_id, true).await?;
    Ok(Json(ApiResponse::ok(lists)))
}

/// POST /api/lists
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateListRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MediaList>>)> {
    input.validate()?;
    validate_list_name(&input.name)?;

    let create = CreateMediaList {
        name: input.name.trim().to_string(),
        description: input.description,
        is_public: input.is_public,
    };
    let list = ListRepo::create(&state.pool, auth.user_id, &create)
        .await
        .map_err(map_unique(
            list_repo::UNIQUE_USER_NAME,
            codes::LIST_EXISTS,
            "You already have a list with this name",
        ))?;

    tracing::info!(list_id = list.id, user_id = auth.user_id, "List created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(list))))
}

/// GET /api/lists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<ListDetail>>> {
    let list = load_visible(&state, auth.as_ref(), id).await?;
    let items = ListRepo::items(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok(ListDetail { list, items })))
}

/// PUT /api/lists/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateListRequest>,
) -> AppResult<Json<ApiResponse<MediaList>>> {
    input.validate()?;
    if let Some(name) = &input.name {
        validate_list_name(name)?;
    }
    load_owned(&state, &auth, id).await?;

    let update = UpdateMediaList {
        name: input.name.map(|n| n.trim().to_string()),
        description: input.description,
        is_public: input.is_public,
    };
    let list = ListRepo::update(&state.pool, id, &update)
        .await
        .map_err(|err| {
            if mediashelf_db::is_unique_violation(&err, list_repo::UNIQUE_USER_NAME) {
                list_exists()
            } else {
                AppError::Database(err)
            }
        })?
        .ok_or_else(|| not_found("List", id))?;

    tracing::info!(list_id = id, user_id = auth.user_id, "List updated");

    Ok(Json(ApiResponse::ok(list)))
}

/// DELETE /api/lists/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    load_owned(&state, &auth, id).await?;

    if !ListRepo::delete(&state.pool, id).await? {
        return Err(not_found("List", id));
    }

    tracing::info!(list_id = id, user_id = auth.user_id, "List deleted");

    Ok(Json(ApiResponse::message("List deleted")))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/lists/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AddItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MediaListItem>>)> {
    input.validate()?;
    load_owned(&state, &auth, id).await?;

    if MediaRepo::find_title(&state.pool, input.media_id).await?.is_none() {
        return Err(not_found("Media", input.media_id));
    }

    let note = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let item = ListRepo::add_item(&state.pool, id, input.media_id, note)
        .await
        .map_err(map_unique(
            list_repo::UNIQUE_LIST_MEDIA,
            codes::LIST_ITEM_EXISTS,
            "This media is already in the list",
        ))?;

    tracing::info!(
        list_id = id,
        media_id = input.media_id,
        position = item.position,
        "List item added",
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

/// DELETE /api/lists/{id}/items/{media_id}
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(path): AppPath<ListItemPath>,
) -> AppResult<Json<ApiResponse<()>>> {
    load_owned(&state, &auth, path.id).await?;

    if !ListRepo::remove_item(&state.pool, path.id, path.media_id).await? {
        return Err(not_found("List item", path.media_id));
    }

    tracing::info!(list_id = path.id, media_id = path.media_id, "List item removed");

    Ok(Json(ApiResponse::message("Item removed from list")))
}

/// PUT /api/lists/{id}/items/order
///
/// `mediaIds` must be a permutation of the list's current items.
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ReorderRequest>,
) -> AppResult<Json<ApiResponse<Vec<MediaListItem>>>> {
    load_owned(&state, &auth, id).await?;

    if let ReorderOutcome::Rejected(err) =
        ListRepo::reorder(&state.pool, id, &input.media_ids).await?
    {
        return Err(err.into());
    }
    let items = ListRepo::items(&state.pool, id).await?;

    tracing::info!(list_id = id, items = items.len(), "List reordered");

    Ok(Json(ApiResponse::ok(items)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mediashelf_core::roles::Role;

    use super::*;

    fn list(owner: DbId, is_public: bool) -> MediaList {
        MediaList {
            id: 1,
            user_id: owner,
            name: "Favourites".into(),
            description: None,
            is_public,
            item_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller(user_id: DbId, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            role,
            email: "someone@example.com".into(),
        }
    }

    #[test]
    fn private_lists_are_visible_to_owner_and_admin_only() {
        let private = list(1, false);
        assert!(!can_view(None, &private));
        assert!(can_view(Some(&caller(1, Role::User)), &private));
        assert!(can_view(Some(&caller(5, Role::Admin)), &private));
        assert!(!can_view(Some(&caller(5, Role::Moderator)), &private));
    }

    #[test]
    fn public_lists_are_visible_to_anyone() {
        assert!(can_view(None, &list(1, true)));
    }

    #[test]
    fn create_defaults_to_public() {
        let input: CreateListRequest = serde_json::from_str(r#"{"name":"Watch later"}"#).unwrap();
        assert!(input.is_public);
    }
}
