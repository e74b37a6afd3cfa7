//! In-memory challenge store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::challenge::{Challenge, ConsumeOutcome};
use crate::errors::{ChallengeRejection, DomainResult};

use super::r#trait::ChallengeStore;

/// Challenge store guarded by a single mutex.
///
/// Every operation holds the lock for its whole read-modify-write, which makes
/// `issue` an atomic upsert and `consume` an atomic check-and-set.
#[derive(Clone, Default)]
pub struct InMemoryChallengeStore {
    challenges: Arc<Mutex<HashMap<String, Challenge>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.challenges.lock().await.len()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn issue(&self, mut challenge: Challenge) -> DomainResult<()> {
        let mut challenges = self.challenges.lock().await;
        if let Some(previous) = challenges.get(&challenge.identity_email) {
            challenge.supersede(previous);
        }
        challenges.insert(challenge.identity_email.clone(), challenge);
        Ok(())
    }

    async fn consume(
        &self,
        identity_email: &str,
        transaction_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ConsumeOutcome> {
        let mut challenges = self.challenges.lock().await;

        let outcome = match challenges.get_mut(identity_email) {
            Some(challenge) => challenge.try_consume(transaction_id, code, now),
            None => ConsumeOutcome::Rejected(ChallengeRejection::Missing),
        };
        Ok(outcome)
    }

    async fn find(&self, identity_email: &str) -> DomainResult<Option<Challenge>> {
        Ok(self.challenges.lock().await.get(identity_email).cloned())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut challenges = self.challenges.lock().await;
        let before = challenges.len();
        challenges.retain(|_, c| !c.is_purgeable_at(now));
        Ok(before - challenges.len())
    }
}
