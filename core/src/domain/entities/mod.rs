//! Domain entities representing core business objects.

pub mod challenge;
pub mod fraud_alert;
pub mod identity;
pub mod transaction;

#[cfg(test)]
mod tests;

pub use challenge::{
    is_well_formed_code, Challenge, ChallengeState, ConsumeOutcome, CHALLENGE_TTL_SECONDS,
    CODE_LENGTH, MAX_ATTEMPTS, RETENTION_GRACE_SECONDS,
};
pub use fraud_alert::{AlertSeverity, AlertStatus, FraudAlert};
pub use identity::{mask_email, Identity};
pub use transaction::{FraudScore, Transaction, TransactionStatus, Verdict};
