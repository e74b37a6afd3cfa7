//! Request and response bodies

pub mod alert;
pub mod transaction;
pub mod verify;

pub use alert::{AlertResponse, PendingAlertsQuery};
pub use transaction::{CreateTransactionRequest, CreateTransactionResponse, TransactionResponse};
pub use verify::{ResendOtpRequest, ResendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
