//! Fraud alert log interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::fraud_alert::FraudAlert;
use crate::errors::DomainResult;

/// Append-only log of flagged transactions awaiting human review
#[async_trait]
pub trait FraudAlertRepository: Send + Sync {
    /// Persist a new alert.
    ///
    /// At most one alert exists per transaction; a second alert for the same
    /// transaction fails with `Storage`.
    async fn create(&self, alert: FraudAlert) -> DomainResult<FraudAlert>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FraudAlert>>;

    async fn find_by_transaction(&self, transaction_id: Uuid) -> DomainResult<Option<FraudAlert>>;

    /// Pending alerts, newest first
    async fn find_pending(&self, limit: usize) -> DomainResult<Vec<FraudAlert>>;

    /// Move an alert to `reviewed`.
    ///
    /// `NotFound` for an unknown id, `InvalidInput` if it was already reviewed.
    async fn mark_reviewed(&self, id: Uuid, reviewer: &str, at: DateTime<Utc>) -> DomainResult<FraudAlert>;
}
