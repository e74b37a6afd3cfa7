//! Verification pipeline configuration
//!
//! Covers the challenge lifetime, the bounded waits on the scoring oracle and
//! the notification sink, and which adapters back each collaborator.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::env_or;

/// Challenge lifetime and collaborator timeouts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Seconds a challenge stays live after issuance
    pub challenge_ttl_seconds: i64,

    /// Upper bound on a single scoring call, in milliseconds
    pub oracle_timeout_ms: u64,

    /// Upper bound on a single notification dispatch, in milliseconds
    pub notification_timeout_ms: u64,

    /// Interval between expired-challenge purges, in seconds (0 disables)
    pub purge_interval_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_seconds: 300,
            oracle_timeout_ms: 2_000,
            notification_timeout_ms: 5_000,
            purge_interval_seconds: 600,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            challenge_ttl_seconds: env_or("CHALLENGE_TTL_SECONDS", defaults.challenge_ttl_seconds),
            oracle_timeout_ms: env_or("ORACLE_TIMEOUT_MS", defaults.oracle_timeout_ms),
            notification_timeout_ms: env_or(
                "NOTIFICATION_TIMEOUT_MS",
                defaults.notification_timeout_ms,
            ),
            purge_interval_seconds: env_or(
                "CHALLENGE_PURGE_INTERVAL_SECONDS",
                defaults.purge_interval_seconds,
            ),
        }
    }
}

/// Which scoring oracle implementation to load at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleProvider {
    /// Remote classifier reached over HTTP (`POST /predict`)
    #[default]
    Http,
    /// Logistic model loaded from a JSON file
    ModelFile,
}

impl FromStr for OracleProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(OracleProvider::Http),
            "model-file" | "model_file" | "file" => Ok(OracleProvider::ModelFile),
            _ => Err(format!("Unknown oracle provider: {}", s)),
        }
    }
}

/// Scoring oracle settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleConfig {
    pub provider: OracleProvider,
    /// Base URL of the classifier service
    pub url: String,
    /// Path to the JSON model file
    pub model_path: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::Http,
            url: String::from("http://localhost:5001"),
            model_path: String::from("models/paywatch_model.json"),
        }
    }
}

impl OracleConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env_or("ORACLE_PROVIDER", defaults.provider),
            url: env_or("ML_SERVICE_URL", defaults.url),
            model_path: env_or("ORACLE_MODEL_PATH", defaults.model_path),
        }
    }
}

/// Which notification sink delivers challenge codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationProvider {
    /// Write a masked delivery record to the log (development)
    #[default]
    Log,
    /// Send through an HTTP email API
    HttpEmail,
}

impl FromStr for NotificationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" | "mock" => Ok(NotificationProvider::Log),
            "http-email" | "http_email" | "email" => Ok(NotificationProvider::HttpEmail),
            _ => Err(format!("Unknown notification provider: {}", s)),
        }
    }
}

/// Notification sink settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub provider: NotificationProvider,
    /// Mail-send endpoint of the email API
    pub endpoint: String,
    /// Bearer credential for the email API
    pub api_key: String,
    /// Sender address
    pub from_address: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider: NotificationProvider::Log,
            endpoint: String::from("https://api.sendgrid.com/v3/mail/send"),
            api_key: String::new(),
            from_address: String::from("PayWatch <noreply@paywatch.com>"),
        }
    }
}

impl NotificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env_or("NOTIFICATION_PROVIDER", defaults.provider),
            endpoint: env_or("EMAIL_API_ENDPOINT", defaults.endpoint),
            api_key: env_or("EMAIL_API_KEY", defaults.api_key),
            from_address: env_or("EMAIL_FROM", defaults.from_address),
        }
    }
}

/// Where the ledger, alert log and challenge store live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    /// Process-local stores; state is lost on restart
    #[default]
    Memory,
    /// MySQL ledger and alert log with a Redis challenge store
    MysqlRedis,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mysql-redis" | "mysql_redis" | "mysql" => Ok(StorageBackend::MysqlRedis),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}
