//! API response envelopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. `CHALLENGE_NOT_FOUND`)
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

/// Health endpoint body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Backend name to `up` or `down`; absent when no backend is checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<String, String>>,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            version: version.into(),
            checks: None,
            timestamp: Utc::now(),
        }
    }

    /// Record one backend result; any `false` marks the whole response unhealthy
    pub fn with_check(mut self, name: impl Into<String>, healthy: bool) -> Self {
        if !healthy {
            self.status = "unhealthy".to_string();
        }
        self.checks
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), if healthy { "up" } else { "down" }.to_string());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_with_detail() {
        let response = ErrorResponse::new("INVALID_CODE", "Invalid verification code")
            .with_detail("field", serde_json::json!("otp"));

        assert_eq!(response.error, "INVALID_CODE");
        assert_eq!(response.details.unwrap()["field"], "otp");
    }

    #[test]
    fn test_health_response_checks() {
        let plain = HealthResponse::healthy("svc", "1.0.0");
        assert!(plain.is_healthy());
        assert!(serde_json::to_value(&plain).unwrap().get("checks").is_none());

        let degraded = HealthResponse::healthy("svc", "1.0.0")
            .with_check("mysql", true)
            .with_check("redis", false);
        assert!(!degraded.is_healthy());
        let json = serde_json::to_value(&degraded).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["checks"]["mysql"], "up");
        assert_eq!(json["checks"]["redis"], "down");
    }

    #[test]
    fn test_error_response_skips_empty_details() {
        let response = ErrorResponse::new("NOT_FOUND", "Transaction not found");
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("details").is_none());
        assert_eq!(json["error"], "NOT_FOUND");
    }
}
