//! Transaction ledger interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::transaction::Transaction;
use crate::errors::DomainResult;

/// Persistence for scored transactions.
///
/// Creation is append-only. The verification fields are the only ones an
/// implementation may change after `create`.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persist a newly scored transaction
    async fn create(&self, transaction: Transaction) -> DomainResult<Transaction>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Transaction>>;

    /// Record a successful challenge: `status = approved`, `verified = true`.
    ///
    /// Idempotent. A transaction that is already verified is returned as is.
    /// Returns `NotFound` when no transaction has this id.
    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<Transaction>;
}
