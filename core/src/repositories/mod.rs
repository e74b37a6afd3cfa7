pub mod challenge;
pub mod fraud_alert;
pub mod transaction;

pub use challenge::{ChallengeStore, InMemoryChallengeStore};
pub use fraud_alert::{FraudAlertRepository, InMemoryFraudAlertRepository};
pub use transaction::{InMemoryTransactionRepository, TransactionRepository};
