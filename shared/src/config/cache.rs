//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Redis configuration for the challenge store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Key prefix for challenge records
    pub key_prefix: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: String::from("paywatch:challenge"),
            connection_timeout: 5,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or("REDIS_URL", defaults.url),
            key_prefix: env_or("REDIS_KEY_PREFIX", defaults.key_prefix),
            connection_timeout: env_or("REDIS_CONNECTION_TIMEOUT", defaults.connection_timeout),
        }
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}
