use chrono::{DateTime, Utc};
use pw_core::domain::entities::TransactionStatus;
use pw_core::services::VerifyOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /api/v1/verify/verify-otp`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    pub transaction_id: Uuid,

    /// 6-digit verification code
    #[validate(length(equal = 6))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<VerifyOutcome> for VerifyOtpResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self {
            verified: outcome.verified,
            transaction_id: outcome.transaction_id,
            status: outcome.status,
            verified_at: outcome.verified_at,
        }
    }
}

/// Body of `POST /api/v1/verify/resend-otp`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendOtpRequest {
    pub transaction_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendOtpResponse {
    pub sent: bool,
}
