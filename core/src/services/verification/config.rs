//! Configuration for the verification engine

use std::time::Duration;

use pw_shared::VerificationConfig;

use crate::domain::entities::challenge::CHALLENGE_TTL_SECONDS;

/// Configuration for the verification engine
#[derive(Debug, Clone)]
pub struct VerificationEngineConfig {
    /// Seconds a challenge stays live after issue
    pub challenge_ttl_seconds: i64,
    /// Upper bound on a single classifier call
    pub oracle_timeout: Duration,
    /// Upper bound on a single notification dispatch
    pub notification_timeout: Duration,
}

impl Default for VerificationEngineConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_seconds: CHALLENGE_TTL_SECONDS,
            oracle_timeout: Duration::from_millis(2000),
            notification_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&VerificationConfig> for VerificationEngineConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            challenge_ttl_seconds: config.challenge_ttl_seconds,
            oracle_timeout: Duration::from_millis(config.oracle_timeout_ms),
            notification_timeout: Duration::from_millis(config.notification_timeout_ms),
        }
    }
}
