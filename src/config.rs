//! Connection configuration: environment variables with fallback defaults.

use serde::{Deserialize, Serialize};

/// Defaults used when the corresponding environment variable is unset or
/// fails to parse.
pub mod defaults {
    pub const REDIS_URL: &str = "redis://127.0.0.1:6379";
    pub const POOL_SIZE: u32 = 10;
}

/// Connection settings for [`crate::backend::redis::RedisBackend`].
///
/// `pool_size` is carried even though the current backend holds a single
/// guarded connection (see DESIGN.md) — it is part of the config surface a
/// connection-pooled backend would read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub redis_url: String,
    pub pool_size: u32,
}

impl BackendConfig {
    /// Read `REDIS_URL` / `POOL_SIZE` from the environment, falling back to
    /// [`defaults`] on missing or unparsable values.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| defaults::REDIS_URL.into()),
            pool_size: std::env::var("POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::POOL_SIZE),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            redis_url: defaults::REDIS_URL.into(),
            pool_size: defaults::POOL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_defaults_module() {
        let config = BackendConfig::default();
        assert_eq!(config.redis_url, defaults::REDIS_URL);
        assert_eq!(config.pool_size, defaults::POOL_SIZE);
    }
}
