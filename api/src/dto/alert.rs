use chrono::{DateTime, Utc};
use pw_core::domain::entities::{AlertSeverity, AlertStatus, FraudAlert};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_PENDING_LIMIT: usize = 50;

/// Query of `GET /api/v1/alerts/pending`
#[derive(Debug, Clone, Deserialize)]
pub struct PendingAlertsQuery {
    pub limit: Option<usize>,
}

impl PendingAlertsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PENDING_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    /// Fraud probability on the 0-100 scale
    pub risk_score: f64,
    pub severity: AlertSeverity,
    pub reason: String,
    pub status: AlertStatus,
    pub flagged_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<FraudAlert> for AlertResponse {
    fn from(alert: FraudAlert) -> Self {
        Self {
            id: alert.id,
            transaction_id: alert.transaction_id,
            risk_score: alert.risk_score.as_percentage(),
            severity: alert.severity,
            reason: alert.reason,
            status: alert.status,
            flagged_at: alert.flagged_at,
            reviewed_by: alert.reviewed_by,
            reviewed_at: alert.reviewed_at,
        }
    }
}
