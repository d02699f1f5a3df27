//! In-process fixed-window rate limiting.
//!
//! Each client key gets a counter per scope that resets when its window
//! elapses. `/api/auth/*` has its own, stricter budget so credential
//! guessing cannot consume the general allowance and vice versa.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, OriginalUri, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Prune expired windows once the table grows past this many entries.
const PRUNE_THRESHOLD: usize = 10_000;

/// Budget a request is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Api,
    Auth,
}

impl Scope {
    /// `/api/auth/*` uses the auth budget; everything else the general one.
    pub fn for_path(path: &str) -> Self {
        if path == "/api/auth" || path.starts_with("/api/auth/") {
            Scope::Auth
        } else {
            Scope::Api
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter table keyed by `(scope, client)`.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    auth_max_requests: u32,
    windows: Mutex<HashMap<(Scope, String), Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs.max(1)),
            max_requests: config.max_requests,
            auth_max_requests: config.auth_max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn limit_for(&self, scope: Scope) -> u32 {
        match scope {
            Scope::Api => self.max_requests,
            Scope::Auth => self.auth_max_requests,
        }
    }

    /// Count one request. Returns `Err(retry_after_secs)` once the budget
    /// for the current window is exhausted.
    pub fn check(&self, scope: Scope, client: &str, now: Instant) -> Result<(), u64> {
        let limit = self.limit_for(scope);
        // A poisoned lock only means another request panicked mid-update;
        // the counters are still usable.
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows
            .entry((scope, client.to_string()))
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= limit {
            let elapsed = now.duration_since(entry.started);
            let remaining = self.window.saturating_sub(elapsed);
            return Err(remaining.as_secs().max(1));
        }

        entry.count += 1;
        Ok(())
    }
}

/// Identify the client: first `x-forwarded-for` address, then `x-real-ip`,
/// then the peer address, else `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<std::net::SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying [`RateLimiter`] to every request it wraps.
pub async fn rate_limit(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let peer = req
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0);

    let scope = Scope::for_path(&path);
    let client = client_key(req.headers(), peer);

    match state.rate_limiter.check(scope, &client, Instant::now()) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            warn!(client = %client, ?scope, path = %path, "Rate limit exceeded");
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}
