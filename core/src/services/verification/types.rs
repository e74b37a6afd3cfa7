//! Result types for the verification engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::transaction::{FraudScore, TransactionStatus, Verdict};

/// Raw classifier output before validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// `0` legitimate, `1` fraudulent
    pub label: u8,
    /// Fraud probability in `[0, 1]`
    pub probability: f64,
}

/// Result of `score_and_decide`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub transaction_id: Uuid,
    pub verdict: Verdict,
    pub fraud_score: FraudScore,
    pub requires_challenge: bool,
    /// `None` when no challenge was issued
    pub notification_delivered: Option<bool>,
}

/// Result of a successful `verify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub transaction_id: Uuid,
    pub verified: bool,
    pub status: TransactionStatus,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Payload handed to a notification sink
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeNotification {
    pub email: String,
    pub code: String,
    pub amount: Option<f64>,
    pub transaction_id: Uuid,
    pub expires_in_seconds: i64,
}

// Keep codes out of debug logs
impl fmt::Debug for ChallengeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeNotification")
            .field("email", &self.email)
            .field("code", &"******")
            .field("amount", &self.amount)
            .field("transaction_id", &self.transaction_id)
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}
