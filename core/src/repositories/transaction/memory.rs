//! In-memory transaction ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::transaction::Transaction;
use crate::errors::{DomainError, DomainResult};

use super::r#trait::TransactionRepository;

/// Transaction ledger backed by a `HashMap`, used by tests and the `memory` backend
#[derive(Clone, Default)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn create(&self, transaction: Transaction) -> DomainResult<Transaction> {
        let mut transactions = self.transactions.write().await;

        if transactions.contains_key(&transaction.id) {
            return Err(DomainError::storage(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }

        transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&id).cloned())
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<Transaction> {
        let mut transactions = self.transactions.write().await;

        let transaction = transactions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("transaction"))?;
        transaction.mark_verified(at);
        Ok(transaction.clone())
    }
}
