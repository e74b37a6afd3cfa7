//! Shared configuration and common types for the PayWatch server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Response envelopes shared by the API layer

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, Environment, LoggingConfig,
    NotificationConfig, NotificationProvider, OracleConfig, OracleProvider, ServerConfig,
    StorageBackend, VerificationConfig,
};
pub use types::response::{ErrorResponse, HealthResponse};
