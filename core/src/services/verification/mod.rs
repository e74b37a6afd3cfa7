//! Transaction verification pipeline
//!
//! Scores a transaction through the classifier, challenges the owner with a
//! one-time code when it is flagged, and reconciles the ledger from the
//! challenge outcome:
//! - `score_and_decide` persists the transaction and, when flagged, an alert and a challenge
//! - `verify` consumes the challenge exactly once and approves the transaction
//! - `resend` replaces the challenge with a fresh code
//! - `transaction` reads a transaction, finishing any interrupted approval

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use config::VerificationEngineConfig;
pub use service::{DynVerificationEngine, VerificationEngine};
pub use traits::{NotificationSink, ScoringOracle};
pub use types::{ChallengeNotification, Classification, Decision, VerifyOutcome};
