//! Handlers for the `/genres` and `/platforms` taxonomies.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::slug::slugify;
use mediashelf_db::models::genre::{Genre, Platform};
use mediashelf_db::repositories::{GenreRepo, PlatformRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireModerator;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body shared by genre and platform creation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaxonomyRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub name: String,
}

impl CreateTaxonomyRequest {
    /// Trimmed name and its slug. A name with no alphanumerics is rejected.
    fn name_and_slug(&self) -> Result<(String, String), CoreError> {
        let name = self.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(CoreError::Validation(
                "name must contain at least one letter or digit".into(),
            ));
        }
        Ok((name, slug))
    }
}

/// Map a unique violation on either the name or the slug constraint.
fn duplicate(
    table: &'static str,
    code: &'static str,
    message: &'static str,
) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        let name_constraint = format!("uq_{table}_name");
        let slug_constraint = format!("uq_{table}_slug");
        if mediashelf_db::is_unique_violation(&err, &name_constraint)
            || mediashelf_db::is_unique_violation(&err, &slug_constraint)
        {
            AppError::Core(CoreError::conflict(code, message))
        } else {
            AppError::Database(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// GET /api/genres
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Genre>>>> {
    let genres = GenreRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(genres)))
}

/// POST /api/genres
pub async fn create_genre(
    State(state): State<AppState>,
    RequireModerator(auth): RequireModerator,
    AppJson(input): AppJson<CreateTaxonomyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Genre>>)> {
    input.validate()?;
    let (name, slug) = input.name_and_slug()?;

    let genre = GenreRepo::create(&state.pool, &name, &slug)
        .await
        .map_err(duplicate("genres", codes::GENRE_EXISTS, "Genre already exists"))?;
    state.cache.invalidate_media().await;

    tracing::info!(genre_id = genre.id, slug = %genre.slug, user_id = auth.user_id, "Genre created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(genre))))
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// GET /api/platforms
pub async fn list_platforms(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Platform>>>> {
    let platforms = PlatformRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(platforms)))
}

/// POST /api/platforms
pub async fn create_platform(
    State(state): State<AppState>,
    RequireModerator(auth): RequireModerator,
    AppJson(input): AppJson<CreateTaxonomyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Platform>>)> {
    input.validate()?;
    let (name, slug) = input.name_and_slug()?;

    let platform = PlatformRepo::create(&state.pool, &name, &slug)
        .await
        .map_err(duplicate("platforms", codes::PLATFORM_EXISTS, "Platform already exists"))?;
    state.cache.invalidate_media().await;

    tracing::info!(
        platform_id = platform.id,
        slug = %platform.slug,
        user_id = auth.user_id,
        "Platform created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(platform))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_only_name_is_rejected() {
        let input = CreateTaxonomyRequest { name: "&&&".into() };
        assert!(input.name_and_slug().is_err());
    }

    #[test]
    fn name_is_trimmed_and_slugged() {
        let input = CreateTaxonomyRequest {
            name: "  Science Fiction ".into(),
        };
        assert_eq!(
            input.name_and_slug().unwrap(),
            ("Science Fiction".to_string(), "science-fiction".to_string())
        );
    }
}
