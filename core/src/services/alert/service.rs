use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::fraud_alert::FraudAlert;
use crate::domain::entities::identity::Identity;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::FraudAlertRepository;

/// Largest page of the review queue
pub const MAX_PENDING_LIMIT: usize = 100;

/// Review queue over the fraud alert log.
///
/// Reviewing an alert never changes the transaction it refers to.
pub struct FraudAlertService<A: FraudAlertRepository + ?Sized> {
    alerts: Arc<A>,
}

impl<A: FraudAlertRepository + ?Sized> FraudAlertService<A> {
    pub fn new(alerts: Arc<A>) -> Self {
        Self { alerts }
    }

    /// Pending alerts, newest first; `limit` is clamped to `1..=100`
    pub async fn pending(&self, limit: usize) -> DomainResult<Vec<FraudAlert>> {
        self.alerts.find_pending(limit.clamp(1, MAX_PENDING_LIMIT)).await
    }

    /// Mark an alert reviewed by `reviewer`. Nobody reviews an alert raised
    /// on their own transaction.
    pub async fn review(&self, alert_id: Uuid, reviewer: &Identity) -> DomainResult<FraudAlert> {
        if reviewer.email.trim().is_empty() {
            return Err(DomainError::invalid_input("reviewer", "reviewer is required"));
        }

        let alert = self
            .alerts
            .find_by_id(alert_id)
            .await?
            .ok_or_else(|| DomainError::not_found("alert"))?;

        if alert.identity_id == reviewer.id {
            tracing::warn!(
                alert_id = %alert.id,
                identity_id = %reviewer.id,
                event = "self_review_rejected",
                "Reviewer attempted to clear an alert on their own transaction"
            );
            return Err(DomainError::Forbidden);
        }

        let alert = self.alerts.mark_reviewed(alert_id, &reviewer.email, Utc::now()).await?;
        tracing::info!(
            alert_id = %alert.id,
            transaction_id = %alert.transaction_id,
            reviewer = %reviewer.email,
            event = "fraud_alert_reviewed",
            "Fraud alert reviewed"
        );
        Ok(alert)
    }
}
