use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database (or an enabled cache) is down.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub cache_enabled: bool,
    pub cache_healthy: bool,
}

/// Always answers 200 so load balancers can read the body.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match mediashelf_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };
    let cache_enabled = state.cache.is_enabled();
    let cache_healthy = cache_enabled && state.cache.ping().await;

    Json(HealthResponse {
        status: health_status(db_healthy, cache_enabled, cache_healthy),
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        cache_enabled,
        cache_healthy,
    })
}

fn health_status(db_healthy: bool, cache_enabled: bool, cache_healthy: bool) -> &'static str {
    if db_healthy && (!cache_enabled || cache_healthy) {
        "ok"
    } else {
        "degraded"
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_does_not_degrade() {
        assert_eq!(health_status(true, false, false), "ok");
        assert_eq!(health_status(true, true, false), "degraded");
        assert_eq!(health_status(false, false, false), "degraded");
    }
}
