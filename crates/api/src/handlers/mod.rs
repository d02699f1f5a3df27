//! Request handlers for the Mediashelf resources.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `mediashelf_db` and
//! map errors via [`AppError`].

pub mod auth;
pub mod genres;
pub mod lists;
pub mod media;
pub mod notifications;
pub mod ratings;
pub mod reviews;
pub mod users;

use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;

use crate::error::AppError;

/// 404 for a missing entity.
pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}
