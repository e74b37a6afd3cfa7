//! Traits for the classifier and notification integrations

use async_trait::async_trait;

use super::types::{ChallengeNotification, Classification};

/// Opaque fraud classifier
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Classify a transaction from its amount and time feature
    async fn classify(&self, amount: f64, time: f64) -> Result<Classification, String>;
}

/// Delivery channel for challenge codes
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a code to its owner, returning a provider message id
    async fn notify(&self, notification: &ChallengeNotification) -> Result<String, String>;
}
