use std::num::{NonZeroU64, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

use mangaledger_content::gateway::{DEFAULT_FETCH_TIMEOUT, DEFAULT_GATEWAY_URL};
use mangaledger_content::{GatewayConfig, DEFAULT_CACHE_CAPACITY};
use mangaledger_history::indexer::DEFAULT_EVENT_LOG_TIMEOUT;
use mangaledger_history::{EventLogConfig, WalkOptions, MAX_HISTORY_RECORDS};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Content gateway base URL and per-fetch timeout.
    pub gateway: GatewayConfig,
    /// Memoize gateway payloads in process (default: `true`).
    pub content_cache: bool,
    /// Maximum number of memoized payloads (default: `1024`).
    pub content_cache_capacity: NonZeroUsize,
    /// Anchor event indexer connection settings.
    pub event_log: EventLogConfig,
    /// History walk limits.
    pub walk: WalkOptions,
}

/// Read an env var, falling back to `default` when unset.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a setting that must be a positive integer.
///
/// Zero is rejected: a zero timeout fails every request and a zero limit
/// empties every result.
fn parse_positive<T: FromStr>(key: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{key} must be a positive integer, got {raw:?}"))
}

/// Read a positive integer env var, falling back to `default` when unset.
///
/// Panics on zero or unparseable values so misconfiguration fails at startup.
fn env_positive<T: FromStr>(key: &str, default: &str) -> T {
    parse_positive(key, &env_or(key, default)).unwrap_or_else(|e| panic!("{e}"))
}

/// Read an optional env var, treating blank values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `GATEWAY_URL`            | `https://ipfs.io/ipfs/`    |
    /// | `FETCH_TIMEOUT_SECS`     | `5`                        |
    /// | `CONTENT_CACHE`          | `true`                     |
    /// | `CONTENT_CACHE_CAPACITY` | `1024`                     |
    /// | `EVENT_LOG_URL`          | unset                      |
    /// | `CONTRACT_ADDRESS`       | unset                      |
    /// | `HISTORY_MAX_RECORDS`    | `100`                      |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            env_positive::<NonZeroU64>("REQUEST_TIMEOUT_SECS", "30").get();

        let fetch_timeout_secs = env_positive::<NonZeroU64>(
            "FETCH_TIMEOUT_SECS",
            &DEFAULT_FETCH_TIMEOUT.as_secs().to_string(),
        );

        let gateway = GatewayConfig {
            base_url: env_or("GATEWAY_URL", DEFAULT_GATEWAY_URL),
            timeout: Duration::from_secs(fetch_timeout_secs.get()),
        };

        let content_cache: bool = env_or("CONTENT_CACHE", "true")
            .parse()
            .expect("CONTENT_CACHE must be true or false");

        let content_cache_capacity = env_positive::<NonZeroUsize>(
            "CONTENT_CACHE_CAPACITY",
            &DEFAULT_CACHE_CAPACITY.to_string(),
        );

        let event_log = EventLogConfig {
            endpoint: env_opt("EVENT_LOG_URL"),
            contract_address: env_opt("CONTRACT_ADDRESS"),
            timeout: DEFAULT_EVENT_LOG_TIMEOUT,
        };

        let max_records = env_positive::<NonZeroUsize>(
            "HISTORY_MAX_RECORDS",
            &MAX_HISTORY_RECORDS.to_string(),
        );

        let walk = WalkOptions {
            max_records: max_records.get(),
            ..Default::default()
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            gateway,
            content_cache,
            content_cache_capacity,
            event_log,
            walk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_settings_reject_zero() {
        assert!(parse_positive::<NonZeroUsize>("HISTORY_MAX_RECORDS", "0").is_err());
        assert!(parse_positive::<NonZeroU64>("FETCH_TIMEOUT_SECS", "0").is_err());
        assert!(parse_positive::<NonZeroUsize>("CONTENT_CACHE_CAPACITY", "0").is_err());
    }

    #[test]
    fn positive_settings_reject_garbage() {
        let err = parse_positive::<NonZeroU64>("FETCH_TIMEOUT_SECS", "-5").unwrap_err();
        assert!(err.contains("FETCH_TIMEOUT_SECS"));
        assert!(parse_positive::<NonZeroU64>("FETCH_TIMEOUT_SECS", "five").is_err());
    }

    #[test]
    fn positive_settings_accept_positive_values() {
        let max: NonZeroUsize = parse_positive("HISTORY_MAX_RECORDS", " 100 ").unwrap();
        assert_eq!(max.get(), 100);
        let timeout: NonZeroU64 = parse_positive("FETCH_TIMEOUT_SECS", "5").unwrap();
        assert_eq!(timeout.get(), 5);
    }
}
