//! Configuration module with business-specific sub-modules
//!
//! - `auth` - identity token verification
//! - `cache` - Redis connection for the challenge store
//! - `database` - MySQL connection for the ledger and alert log
//! - `environment` - environment detection and logging
//! - `server` - HTTP server binding
//! - `verification` - challenge lifetime, oracle, notification and storage selection

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use server::ServerConfig;
pub use verification::{
    NotificationConfig, NotificationProvider, OracleConfig, OracleProvider, StorageBackend,
    VerificationConfig,
};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub verification: VerificationConfig,
    pub oracle: OracleConfig,
    pub notification: NotificationConfig,
    pub storage: StorageBackend,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env(),
            verification: VerificationConfig::from_env(),
            oracle: OracleConfig::from_env(),
            notification: NotificationConfig::from_env(),
            storage: env_or("STORAGE_BACKEND", StorageBackend::Memory),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
/// when it is unset or does not parse.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_parse_error() {
        std::env::set_var("PW_TEST_BAD_NUMBER", "not-a-number");
        assert_eq!(env_or("PW_TEST_BAD_NUMBER", 42u64), 42);
        std::env::remove_var("PW_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_env_or_reads_value() {
        std::env::set_var("PW_TEST_GOOD_NUMBER", "7");
        assert_eq!(env_or("PW_TEST_GOOD_NUMBER", 42u64), 7);
        std::env::remove_var("PW_TEST_GOOD_NUMBER");
    }

    #[test]
    fn test_default_config_uses_memory_storage() {
        let config = AppConfig::default();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.verification.challenge_ttl_seconds, 300);
    }
}
