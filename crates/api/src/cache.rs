//! Optional Redis-backed JSON cache for hot media reads.
//!
//! When no `REDIS_URL` is configured every operation is a no-op. Redis
//! failures are logged and reported as misses; they never fail a request.

use std::fmt;
use std::time::Duration;

use mediashelf_core::types::DbId;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Key prefix shared by all media cache entries.
pub const MEDIA_PATTERN: &str = "media:*";

/// Cache key for a single media entry.
pub fn media_detail_key(id: DbId) -> String {
    format!("media:detail:{id}")
}

/// Cache key for a media listing. `canonical_query` must encode every
/// parameter that affects the result, in a fixed order.
pub fn media_list_key(canonical_query: &str) -> String {
    let digest = Sha256::digest(canonical_query.as_bytes());
    let hex = format!("{digest:x}");
    format!("media:list:{}", &hex[..16])
}

#[derive(Clone)]
pub struct Cache {
    conn: Option<ConnectionManager>,
    ttl: Duration,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("enabled", &self.conn.is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Cache {
    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            conn: None,
            ttl: Duration::ZERO,
        }
    }

    /// Connect to Redis.
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, redis::RedisError> {
        info!("Connecting to Redis cache");
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to Redis cache");
        Ok(Self {
            conn: Some(conn),
            ttl,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    /// Fetch and decode a cached value.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Cache GET failed");
                return None;
            }
        };

        match data {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => {
                    debug!(key, "Cache HIT");
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            None => {
                debug!(key, "Cache MISS");
                None
            }
        }
    }

    /// Store a value with the configured TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        let ttl = self.ttl.as_secs().max(1);
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, ttl).await {
            warn!(key, error = %e, "Cache SETEX failed");
        }
    }

    /// Delete every key matching `pattern`.
    pub async fn delete_pattern(&self, pattern: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, error = %e, "Cache KEYS failed");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        debug!(pattern, count = keys.len(), "Invalidating cache keys");
        if let Err(e) = conn.del::<_, ()>(keys).await {
            warn!(pattern, error = %e, "Cache DEL failed");
        }
    }

    /// Drop all cached media detail and listing entries.
    pub async fn invalidate_media(&self) {
        self.delete_pattern(MEDIA_PATTERN).await;
    }

    /// Round-trip a `PING`. Returns `false` when disabled or unreachable.
    pub async fn ping(&self) -> bool {
        let Some(mut conn) = self.conn.clone() else {
            return false;
        };
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }
}
