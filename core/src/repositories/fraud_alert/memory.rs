//! In-memory fraud alert log

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::fraud_alert::FraudAlert;
use crate::errors::{DomainError, DomainResult};

use super::r#trait::FraudAlertRepository;

#[derive(Clone, Default)]
pub struct InMemoryFraudAlertRepository {
    alerts: Arc<RwLock<HashMap<Uuid, FraudAlert>>>,
}

impl InMemoryFraudAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All alerts raised for a transaction (at most one)
    pub async fn count_for_transaction(&self, transaction_id: Uuid) -> usize {
        let alerts = self.alerts.read().await;
        alerts.values().filter(|a| a.transaction_id == transaction_id).count()
    }

    pub async fn len(&self) -> usize {
        self.alerts.read().await.len()
    }
}

#[async_trait]
impl FraudAlertRepository for InMemoryFraudAlertRepository {
    async fn create(&self, alert: FraudAlert) -> DomainResult<FraudAlert> {
        let mut alerts = self.alerts.write().await;

        if alerts.values().any(|a| a.transaction_id == alert.transaction_id) {
            return Err(DomainError::storage(format!(
                "fraud alert for transaction {} already exists",
                alert.transaction_id
            )));
        }

        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FraudAlert>> {
        Ok(self.alerts.read().await.get(&id).cloned())
    }

    async fn find_by_transaction(&self, transaction_id: Uuid) -> DomainResult<Option<FraudAlert>> {
        let alerts = self.alerts.read().await;
        Ok(alerts.values().find(|a| a.transaction_id == transaction_id).cloned())
    }

    async fn find_pending(&self, limit: usize) -> DomainResult<Vec<FraudAlert>> {
        let alerts = self.alerts.read().await;
        let mut pending: Vec<FraudAlert> = alerts.values().filter(|a| a.is_pending()).cloned().collect();
        pending.sort_by(|a, b| b.flagged_at.cmp(&a.flagged_at));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_reviewed(&self, id: Uuid, reviewer: &str, at: DateTime<Utc>) -> DomainResult<FraudAlert> {
        let mut alerts = self.alerts.write().await;

        let alert = alerts.get_mut(&id).ok_or_else(|| DomainError::not_found("fraud alert"))?;
        alert.review(reviewer, at)?;
        Ok(alert.clone())
    }
}
