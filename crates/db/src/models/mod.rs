//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row (serialized in
//!   camelCase when it is safe to return directly)
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod follow;
pub mod genre;
pub mod list;
pub mod media;
pub mod notification;
pub mod rating;
pub mod refresh_token;
pub mod review;
pub mod user;
