//! Domain-specific error types and error handling.

use thiserror::Error;


/// Errors surfaced by the verification pipeline.
///
/// Every variant carries a stable machine-readable code (see [`DomainError::code`])
/// that the API layer maps onto an HTTP status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Scoring oracle unavailable: {message}")]
    OracleUnavailable { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Access to this resource is forbidden")]
    Forbidden,

    #[error("No active verification code for this transaction")]
    ChallengeNotFound,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Notification delivery failed: {message}")]
    NotificationFailed { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn oracle_unavailable(message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            message: message.into(),
        }
    }

    /// Stable error code used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::OracleUnavailable { .. } => "ORACLE_UNAVAILABLE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::InvalidCode => "INVALID_CODE",
            Self::NotificationFailed { .. } => "NOTIFICATION_FAILED",
            Self::Storage { .. } => "STORAGE_ERROR",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a challenge could not be consumed.
///
/// Recorded in logs only. Callers always see [`DomainError::ChallengeNotFound`]
/// so that a probe cannot tell an expired code from a used one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeRejection {
    Missing,
    Consumed,
    Expired,
    WrongTransaction,
    /// The code belongs to a challenge that a later issue replaced
    Superseded,
    /// Too many wrong codes were submitted against this challenge
    AttemptsExceeded,
}

impl ChallengeRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Consumed => "consumed",
            Self::Expired => "expired",
            Self::WrongTransaction => "wrong_transaction",
            Self::Superseded => "superseded",
            Self::AttemptsExceeded => "attempts_exceeded",
        }
    }
}

impl std::fmt::Display for ChallengeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
