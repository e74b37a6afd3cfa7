//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and migrations
//! - Transaction ledger repository
//! - Fraud alert log repository

pub mod connection;
pub mod fraud_alert_repository;
pub mod transaction_repository;


use sqlx::mysql::{MySql, MySqlRow};
use sqlx::Row;

use pw_core::errors::{DomainError, DomainResult};

// Re-export commonly used types
pub use connection::DatabasePool;
pub use fraud_alert_repository::MySqlFraudAlertRepository;
pub use transaction_repository::MySqlTransactionRepository;

/// Read a column, mapping decode failures to a storage error
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> DomainResult<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to get {}: {}", name, e)))
}

/// Map a query failure to a storage error with context
pub(crate) fn query_error(context: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| {
        tracing::error!(error = %e, context = context, event = "query_failed", "Database query failed");
        DomainError::storage(format!("{}: {}", context, e))
    }
}
