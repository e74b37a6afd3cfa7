//! Scored transaction entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::identity::Identity;

/// Classifier verdict for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Fraudulent,
}

impl Verdict {
    /// Binary label as produced by the classifier
    pub fn label(&self) -> u8 {
        match self {
            Verdict::Legitimate => 0,
            Verdict::Fraudulent => 1,
        }
    }

    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Verdict::Legitimate),
            1 => Some(Verdict::Fraudulent),
            _ => None,
        }
    }

    pub fn is_fraudulent(&self) -> bool {
        matches!(self, Verdict::Fraudulent)
    }
}

/// Fraud probability on the canonical `[0, 1]` scale
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FraudScore(f64);

impl FraudScore {
    /// Returns `None` unless `probability` is finite and within `[0, 1]`
    pub fn new(probability: f64) -> Option<Self> {
        if probability.is_finite() && (0.0..=1.0).contains(&probability) {
            Some(Self(probability))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Score on the 0-100 scale, rounded to two decimals
    pub fn as_percentage(&self) -> f64 {
        (self.0 * 10_000.0).round() / 100.0
    }
}

/// Transaction status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Flagged,
    /// Legacy terminal status; only ever read from storage
    Verified,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Approved => "approved",
            TransactionStatus::Flagged => "flagged",
            TransactionStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Ok(TransactionStatus::Approved),
            "flagged" => Ok(TransactionStatus::Flagged),
            "verified" => Ok(TransactionStatus::Verified),
            other => Err(format!("Unknown transaction status: {}", other)),
        }
    }
}

/// A transaction scored by the classifier.
///
/// Created once per scoring request. Only the status fields change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub identity_id: String,
    pub identity_email: String,
    pub amount: f64,
    /// Classifier time feature, not a wall-clock value
    pub time: f64,
    pub created_at: DateTime<Utc>,
    pub verdict: Verdict,
    pub fraud_score: FraudScore,
    pub status: TransactionStatus,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Builds a new transaction whose status follows the verdict
    pub fn new(
        identity: &Identity,
        amount: f64,
        time: f64,
        verdict: Verdict,
        fraud_score: FraudScore,
        now: DateTime<Utc>,
    ) -> Self {
        let status = match verdict {
            Verdict::Legitimate => TransactionStatus::Approved,
            Verdict::Fraudulent => TransactionStatus::Flagged,
        };

        Self {
            id: Uuid::new_v4(),
            identity_id: identity.id.clone(),
            identity_email: identity.email.clone(),
            amount,
            time,
            created_at: now,
            verdict,
            fraud_score,
            status,
            verified: false,
            verified_at: None,
        }
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.identity_id == identity.id
    }

    pub fn requires_challenge(&self) -> bool {
        self.verdict.is_fraudulent()
    }

    /// Flagged and not yet confirmed through a challenge
    pub fn awaiting_verification(&self) -> bool {
        self.requires_challenge() && !self.verified
    }

    /// Records a successful challenge. Calling it again keeps the first timestamp.
    pub fn mark_verified(&mut self, at: DateTime<Utc>) {
        if self.verified {
            return;
        }
        self.status = TransactionStatus::Approved;
        self.verified = true;
        self.verified_at = Some(at);
    }
}
