//! Domain rules for the Mediashelf API.
//!
//! This crate has no database or HTTP dependencies. It holds the shared
//! primitive types, the domain error enum, and the pure validation and
//! arithmetic helpers used by both the repository and handler layers.

pub mod error;
pub mod lists;
pub mod media;
pub mod notifications;
pub mod pagination;
pub mod rating;
pub mod review;
pub mod roles;
pub mod slug;
pub mod types;
pub mod users;
