//! Mediashelf API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! middleware, seeding) so integration tests and both binaries can share
//! them.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
