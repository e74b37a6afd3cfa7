use chrono::{DateTime, Utc};
use pw_core::domain::entities::{Transaction, TransactionStatus, Verdict};
use pw_core::errors::{DomainError, DomainResult};
use pw_core::services::Decision;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Body of `POST /api/v1/transactions`
///
/// Both features arrive as raw JSON so that a string or a missing value can
/// be reported as a field error instead of a generic body error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
}

impl CreateTransactionRequest {
    /// Numeric features; `None` where the client sent nothing
    pub fn features(&self) -> DomainResult<(Option<f64>, Option<f64>)> {
        Ok((
            numeric_field("amount", self.amount.as_ref())?,
            numeric_field("time", self.time.as_ref())?,
        ))
    }
}

/// Accepts JSON numbers and strings holding a decimal number
fn numeric_field(field: &str, value: Option<&Value>) -> DomainResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| DomainError::invalid_input(field, "must be a number")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| DomainError::invalid_input(field, "must be a number")),
        Some(_) => Err(DomainError::invalid_input(field, "must be a number")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub transaction_id: Uuid,
    pub verdict: Verdict,
    /// Fraud probability on the 0-100 scale
    pub fraud_score: f64,
    pub requires_2fa: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_sent: Option<bool>,
}

impl From<Decision> for CreateTransactionResponse {
    fn from(decision: Decision) -> Self {
        Self {
            transaction_id: decision.transaction_id,
            verdict: decision.verdict,
            fraud_score: decision.fraud_score.as_percentage(),
            requires_2fa: decision.requires_challenge,
            notification_sent: decision.notification_delivered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: f64,
    pub time: f64,
    pub verdict: Verdict,
    pub fraud_score: f64,
    pub status: TransactionStatus,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            time: tx.time,
            verdict: tx.verdict,
            fraud_score: tx.fraud_score.as_percentage(),
            status: tx.status,
            verified: tx.verified,
            verified_at: tx.verified_at,
            created_at: tx.created_at,
        }
    }
}
