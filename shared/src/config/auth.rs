//! Identity token configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Settings used to verify the bearer tokens issued by the identity provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,

    /// Allowed clock skew in seconds when checking `exp`
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::from("change-me-in-production"),
            leeway_seconds: 30,
        }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: env_or("JWT_SECRET", defaults.jwt_secret),
            leeway_seconds: env_or("JWT_LEEWAY_SECONDS", defaults.leeway_seconds),
        }
    }
}
