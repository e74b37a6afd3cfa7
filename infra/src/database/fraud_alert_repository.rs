//! MySQL implementation of the FraudAlertRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use pw_core::domain::entities::fraud_alert::{AlertSeverity, AlertStatus, FraudAlert};
use pw_core::domain::entities::transaction::FraudScore;
use pw_core::errors::{DomainError, DomainResult};
use pw_core::repositories::FraudAlertRepository;

use super::{column, query_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, transaction_id, identity_id, risk_score, severity, reason,
           flagged_at, status, reviewed_by, reviewed_at
    FROM fraud_alerts
"#;

/// Fraud alert log stored in the `fraud_alerts` table
pub struct MySqlFraudAlertRepository {
    pool: MySqlPool,
}

impl MySqlFraudAlertRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_alert(row: &MySqlRow) -> DomainResult<FraudAlert> {
        let id: String = column(row, "id")?;
        let transaction_id: String = column(row, "transaction_id")?;
        let score: f64 = column(row, "risk_score")?;
        let severity: String = column(row, "severity")?;
        let status: String = column(row, "status")?;

        Ok(FraudAlert {
            id: parse_uuid(&id)?,
            transaction_id: parse_uuid(&transaction_id)?,
            identity_id: column(row, "identity_id")?,
            risk_score: FraudScore::new(score)
                .ok_or_else(|| DomainError::storage(format!("Invalid risk score: {}", score)))?,
            severity: severity.parse::<AlertSeverity>().map_err(DomainError::storage)?,
            reason: column(row, "reason")?,
            flagged_at: column(row, "flagged_at")?,
            status: status.parse::<AlertStatus>().map_err(DomainError::storage)?,
            reviewed_by: column(row, "reviewed_by")?,
            reviewed_at: column(row, "reviewed_at")?,
        })
    }
}

fn parse_uuid(value: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| DomainError::storage(format!("Invalid UUID {}: {}", value, e)))
}

#[async_trait]
impl FraudAlertRepository for MySqlFraudAlertRepository {
    async fn create(&self, alert: FraudAlert) -> DomainResult<FraudAlert> {
        let query = r#"
            INSERT INTO fraud_alerts (
                id, transaction_id, identity_id, risk_score, severity, reason,
                flagged_at, status, reviewed_by, reviewed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        // uq_fraud_alerts_transaction rejects a second alert for the same transaction
        sqlx::query(query)
            .bind(alert.id.to_string())
            .bind(alert.transaction_id.to_string())
            .bind(&alert.identity_id)
            .bind(alert.risk_score.value())
            .bind(alert.severity.as_str())
            .bind(&alert.reason)
            .bind(alert.flagged_at)
            .bind(alert.status.as_str())
            .bind(&alert.reviewed_by)
            .bind(alert.reviewed_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to insert fraud alert"))?;

        Ok(alert)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<FraudAlert>> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find fraud alert"))?;

        row.as_ref().map(Self::row_to_alert).transpose()
    }

    async fn find_by_transaction(&self, transaction_id: Uuid) -> DomainResult<Option<FraudAlert>> {
        let query = format!("{} WHERE transaction_id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(transaction_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find fraud alert"))?;

        row.as_ref().map(Self::row_to_alert).transpose()
    }

    async fn find_pending(&self, limit: usize) -> DomainResult<Vec<FraudAlert>> {
        let query = format!(
            "{} WHERE status = 'pending' ORDER BY flagged_at DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to list pending fraud alerts"))?;

        rows.iter().map(Self::row_to_alert).collect()
    }

    async fn mark_reviewed(&self, id: Uuid, reviewer: &str, at: DateTime<Utc>) -> DomainResult<FraudAlert> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin transaction"))?;

        let query = format!("{} WHERE id = ? FOR UPDATE", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error("Failed to lock fraud alert"))?
            .ok_or_else(|| DomainError::not_found("fraud alert"))?;

        let mut alert = Self::row_to_alert(&row)?;
        alert.review(reviewer, at)?;

        sqlx::query(
            "UPDATE fraud_alerts SET status = ?, reviewed_by = ?, reviewed_at = ? WHERE id = ?",
        )
        .bind(alert.status.as_str())
        .bind(&alert.reviewed_by)
        .bind(alert.reviewed_at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(query_error("Failed to update fraud alert"))?;

        tx.commit().await.map_err(query_error("Failed to commit review"))?;

        Ok(alert)
    }
}
