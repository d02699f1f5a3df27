use std::str::FromStr;

use crate::auth::jwt::JwtConfig;
use crate::logging::LogFormat;

/// Longest accepted access-token lifetime (one day).
pub const MAX_ACCESS_EXPIRY_MINS: i64 = 24 * 60;

/// Longest accepted refresh-token lifetime (ten years).
pub const MAX_REFRESH_EXPIRY_DAYS: i64 = 3650;

/// Startup configuration error. Binaries surface these through `anyhow`
/// and exit before binding a socket.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Fixed-window request budgets per client.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: `900`).
    pub window_secs: u64,
    /// Requests per window for general API routes (default: `100`).
    pub max_requests: u32,
    /// Requests per window for `/api/auth/*` (default: `20`).
    pub auth_max_requests: u32,
}

/// Server configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` and `JWT_SECRET` have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string. Caching is disabled when unset.
    pub redis_url: Option<String>,
    /// TTL for cached media reads in seconds (default: `300`).
    pub cache_ttl_secs: u64,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Log output format (default: pretty).
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `DATABASE_URL`                 | required                |
    /// | `REDIS_URL`                    | unset (cache disabled)  |
    /// | `CACHE_TTL_SECS`               | `300`                   |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `JWT_SECRET`                   | required                |
    /// | `JWT_ACCESS_EXPIRY_MINS`       | `15`                    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`      | `7`                     |
    /// | `RATE_LIMIT_WINDOW_SECS`       | `900`                   |
    /// | `RATE_LIMIT_MAX_REQUESTS`      | `100`                   |
    /// | `AUTH_RATE_LIMIT_MAX_REQUESTS` | `20`                    |
    /// | `LOG_FORMAT`                   | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0".to_string())?;
        let port = env_or("PORT", 3000u16)?;
        let database_url = required("DATABASE_URL")?;
        let redis_url = optional("REDIS_URL");
        let cache_ttl_secs = env_or("CACHE_TTL_SECS", 300u64)?;

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30u64)?;

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            access_token_expiry_mins: bounded(
                env_or("JWT_ACCESS_EXPIRY_MINS", 15i64)?,
                "JWT_ACCESS_EXPIRY_MINS",
                MAX_ACCESS_EXPIRY_MINS,
            )?,
            refresh_token_expiry_days: bounded(
                env_or("JWT_REFRESH_EXPIRY_DAYS", 7i64)?,
                "JWT_REFRESH_EXPIRY_DAYS",
                MAX_REFRESH_EXPIRY_DAYS,
            )?,
        };

        let rate_limit = RateLimitConfig {
            window_secs: env_or("RATE_LIMIT_WINDOW_SECS", 900u64)?,
            max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", 100u32)?,
            auth_max_requests: env_or("AUTH_RATE_LIMIT_MAX_REQUESTS", 20u32)?,
        };

        let log_format = env_or("LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            host,
            port,
            database_url,
            redis_url,
            cache_ttl_secs,
            cors_origins,
            request_timeout_secs,
            jwt,
            rate_limit,
            log_format,
        })
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read a required, non-empty variable.
pub fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(var) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        }
    }
}

/// Accept `value` only if it lies in `1..=max`.
fn bounded(value: i64, var: &'static str, max: i64) -> Result<i64, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be greater than 0".into(),
        });
    }
    if value > max {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: format!("must be at most {max}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn non_positive_expiry_is_rejected() {
        assert_matches!(
            bounded(0, "JWT_ACCESS_EXPIRY_MINS", MAX_ACCESS_EXPIRY_MINS),
            Err(ConfigError::Invalid { var: "JWT_ACCESS_EXPIRY_MINS", .. })
        );
        assert_eq!(bounded(15, "X", MAX_ACCESS_EXPIRY_MINS).unwrap(), 15);
    }

    #[test]
    fn oversized_expiry_is_rejected() {
        assert_matches!(
            bounded(100_000_000, "JWT_REFRESH_EXPIRY_DAYS", MAX_REFRESH_EXPIRY_DAYS),
            Err(ConfigError::Invalid { var: "JWT_REFRESH_EXPIRY_DAYS", ref reason, .. })
                if reason.contains("3650")
        );
        assert_matches!(
            bounded(i64::MAX, "JWT_ACCESS_EXPIRY_MINS", MAX_ACCESS_EXPIRY_MINS),
            Err(ConfigError::Invalid { .. })
        );
        assert_eq!(
            bounded(MAX_REFRESH_EXPIRY_DAYS, "X", MAX_REFRESH_EXPIRY_DAYS).unwrap(),
            MAX_REFRESH_EXPIRY_DAYS
        );
    }

    #[test]
    fn unset_variable_uses_default() {
        let port = env_or("MEDIASHELF_TEST_UNSET_PORT", 4000u16).unwrap();
        assert_eq!(port, 4000);
    }
}
