//! Challenge store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::challenge::{Challenge, ConsumeOutcome};
use crate::errors::DomainResult;

/// Holds at most one challenge record per identity email.
///
/// Both mutating operations must be atomic with respect to each other and to
/// concurrent callers. Expiry is enforced when a record is read, so
/// `purge_expired` is storage hygiene only.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Install `challenge` as the only record for its identity, replacing any
    /// prior one. An unconsumed prior record's code is kept as the new
    /// record's superseded code.
    async fn issue(&self, challenge: Challenge) -> DomainResult<()>;

    /// Atomic check-and-set on the consumed flag.
    ///
    /// Only a live challenge bound to `transaction_id` whose code equals `code`
    /// is consumed. A wrong code spends one attempt and consumes nothing.
    async fn consume(
        &self,
        identity_email: &str,
        transaction_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ConsumeOutcome>;

    /// Current record for an identity, whatever its state
    async fn find(&self, identity_email: &str) -> DomainResult<Option<Challenge>>;

    /// Drop records that are past their expiry, keeping consumed records for a
    /// grace period. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize>;
}
