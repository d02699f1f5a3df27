use std::sync::Arc;

use crate::cache::Cache;
use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mediashelf_db::DbPool,
    /// Server configuration (JWT settings, limits).
    pub config: Arc<ServerConfig>,
    /// Optional media read cache.
    pub cache: Cache,
    /// Per-client request counters.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: mediashelf_db::DbPool, config: ServerConfig, cache: Cache) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Self {
            pool,
            config: Arc::new(config),
            cache,
            rate_limiter,
        }
    }
}
