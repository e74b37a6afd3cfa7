//! MySQL implementation of the TransactionRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use pw_core::domain::entities::transaction::{FraudScore, Transaction, TransactionStatus, Verdict};
use pw_core::errors::{DomainError, DomainResult};
use pw_core::repositories::TransactionRepository;

use super::{column, query_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, identity_id, identity_email, amount, time_feature, created_at,
           verdict, fraud_score, status, verified, verified_at
    FROM transactions
"#;

/// Transaction ledger stored in the `transactions` table
pub struct MySqlTransactionRepository {
    pool: MySqlPool,
}

impl MySqlTransactionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_transaction(row: &MySqlRow) -> DomainResult<Transaction> {
        let id: String = column(row, "id")?;
        let verdict: i8 = column(row, "verdict")?;
        let score: f64 = column(row, "fraud_score")?;
        let status: String = column(row, "status")?;

        Ok(Transaction {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::storage(format!("Invalid transaction UUID: {}", e)))?,
            identity_id: column(row, "identity_id")?,
            identity_email: column(row, "identity_email")?,
            amount: column(row, "amount")?,
            time: column(row, "time_feature")?,
            created_at: column(row, "created_at")?,
            verdict: u8::try_from(verdict)
                .ok()
                .and_then(Verdict::from_label)
                .ok_or_else(|| DomainError::storage(format!("Invalid verdict: {}", verdict)))?,
            fraud_score: FraudScore::new(score)
                .ok_or_else(|| DomainError::storage(format!("Invalid fraud score: {}", score)))?,
            status: status.parse::<TransactionStatus>().map_err(DomainError::storage)?,
            verified: column(row, "verified")?,
            verified_at: column(row, "verified_at")?,
        })
    }

    async fn fetch(&self, id: Uuid) -> DomainResult<Option<Transaction>> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find transaction"))?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }
}

#[async_trait]
impl TransactionRepository for MySqlTransactionRepository {
    async fn create(&self, transaction: Transaction) -> DomainResult<Transaction> {
        let query = r#"
            INSERT INTO transactions (
                id, identity_id, identity_email, amount, time_feature, created_at,
                verdict, fraud_score, status, verified, verified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(transaction.id.to_string())
            .bind(&transaction.identity_id)
            .bind(&transaction.identity_email)
            .bind(transaction.amount)
            .bind(transaction.time)
            .bind(transaction.created_at)
            .bind(transaction.verdict.label() as i8)
            .bind(transaction.fraud_score.value())
            .bind(transaction.status.as_str())
            .bind(transaction.verified)
            .bind(transaction.verified_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to insert transaction"))?;

        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Transaction>> {
        self.fetch(id).await
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<Transaction> {
        // Guarded on `verified` so a repeat keeps the first timestamp
        let query = r#"
            UPDATE transactions
            SET status = 'approved', verified = TRUE, verified_at = ?
            WHERE id = ? AND verified = FALSE
        "#;

        sqlx::query(query)
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to mark transaction verified"))?;

        self.fetch(id)
            .await?
            .ok_or_else(|| DomainError::not_found("transaction"))
    }
}
