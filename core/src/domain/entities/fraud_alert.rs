//! Fraud alert raised for every flagged transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::transaction::{FraudScore, Transaction};
use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Reviewed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Reviewed => "reviewed",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AlertStatus::Pending),
            "reviewed" => Ok(AlertStatus::Reviewed),
            other => Err(format!("Unknown alert status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn from_score(score: FraudScore) -> Self {
        let p = score.value();
        if p > 0.8 {
            AlertSeverity::Critical
        } else if p > 0.6 {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(format!("Unknown alert severity: {}", other)),
        }
    }
}

/// Audit record of a flagged transaction.
///
/// Its review lifecycle is independent of the transaction: verifying the
/// transaction leaves the alert pending for a human reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub identity_id: String,
    /// Score snapshot at flag time
    pub risk_score: FraudScore,
    pub severity: AlertSeverity,
    pub reason: String,
    pub flagged_at: DateTime<Utc>,
    pub status: AlertStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl FraudAlert {
    pub fn for_transaction(transaction: &Transaction, now: DateTime<Utc>) -> Self {
        let score = transaction.fraud_score;
        Self {
            id: Uuid::new_v4(),
            transaction_id: transaction.id,
            identity_id: transaction.identity_id.clone(),
            risk_score: score,
            severity: AlertSeverity::from_score(score),
            reason: format!(
                "Classifier flagged transaction (fraud score {:.2}%)",
                score.as_percentage()
            ),
            flagged_at: now,
            status: AlertStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AlertStatus::Pending
    }

    /// Pending -> Reviewed. A second review is rejected.
    pub fn review(&mut self, reviewer: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_pending() {
            return Err(DomainError::invalid_input("alert_id", "alert has already been reviewed"));
        }
        if reviewer.trim().is_empty() {
            return Err(DomainError::invalid_input("reviewer", "reviewer is required"));
        }
        self.status = AlertStatus::Reviewed;
        self.reviewed_by = Some(reviewer.to_string());
        self.reviewed_at = Some(at);
        Ok(())
    }
}
