//! One-time code challenge issued when a transaction is flagged.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ChallengeRejection;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Lifetime of a challenge (5 minutes)
pub const CHALLENGE_TTL_SECONDS: i64 = 300;

/// Wrong codes a challenge absorbs before it stops accepting any code
pub const MAX_ATTEMPTS: u32 = 3;

/// Seconds a consumed record outlives its expiry so the ledger can still be
/// reconciled from it
pub const RETENTION_GRACE_SECONDS: i64 = 600;

/// Lifecycle state of a challenge record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    Live,
    Consumed,
    Expired,
}

/// One-time code bound to an identity and the transaction it authorises.
///
/// At most one record exists per identity email; issuing a new challenge
/// replaces the previous record whatever its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Email of the identity the code was sent to
    pub identity_email: String,

    /// Transaction this challenge authorises
    pub transaction_id: Uuid,

    /// The 6-digit numeric code
    pub code: String,

    pub created_at: DateTime<Utc>,

    /// `created_at` plus the TTL
    pub expires_at: DateTime<Utc>,

    pub consumed: bool,

    pub consumed_at: Option<DateTime<Utc>>,

    /// Wrong codes submitted so far
    #[serde(default)]
    pub attempts: u32,

    /// Code of the unconsumed challenge this one replaced
    #[serde(default)]
    pub superseded_code: Option<String>,
}

/// Result of an atomic consume attempt against a challenge store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The code matched a live challenge, which is now consumed
    Consumed(Challenge),
    /// No live challenge for this transaction
    Rejected(ChallengeRejection),
    /// A live challenge exists but the code differs; one attempt was spent
    WrongCode,
}

impl Challenge {
    /// Issue a fresh challenge with the default TTL
    pub fn issue(identity_email: impl Into<String>, transaction_id: Uuid, now: DateTime<Utc>) -> Self {
        Self::issue_with_ttl(identity_email, transaction_id, now, CHALLENGE_TTL_SECONDS)
    }

    /// Issue a fresh challenge that expires `ttl_seconds` after `now`
    pub fn issue_with_ttl(
        identity_email: impl Into<String>,
        transaction_id: Uuid,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            identity_email: identity_email.into(),
            transaction_id,
            code: Self::generate_code(),
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            consumed: false,
            consumed_at: None,
            attempts: 0,
            superseded_code: None,
        }
    }

    /// Remember the code of the record this challenge replaces, so that code
    /// is reported as dead rather than wrong
    pub fn supersede(&mut self, previous: &Challenge) {
        if !previous.consumed {
            self.superseded_code = Some(previous.code.clone());
        }
    }

    /// Generates a 6-digit code from the operating system CSPRNG
    pub fn generate_code() -> String {
        let code: u32 = OsRng.gen_range(0..1_000_000);
        format!("{:0width$}", code, width = CODE_LENGTH)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> ChallengeState {
        if self.consumed {
            ChallengeState::Consumed
        } else if self.is_expired_at(now) {
            ChallengeState::Expired
        } else {
            ChallengeState::Live
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == ChallengeState::Live
    }

    /// Whether a store may drop this record. Consumed records are kept for
    /// [`RETENTION_GRACE_SECONDS`] past expiry.
    pub fn is_purgeable_at(&self, now: DateTime<Utc>) -> bool {
        if self.consumed {
            now >= self.expires_at + Duration::seconds(RETENTION_GRACE_SECONDS)
        } else {
            self.is_expired_at(now)
        }
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, code: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), code.as_bytes())
    }

    /// Seconds left before expiry, zero once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Check-and-set on this record.
    ///
    /// Stores call this while holding exclusive access to the record, so the
    /// check and the write form one atomic step. Checks run in a fixed order:
    /// consumed, expired, transaction binding, attempt budget, then the code.
    /// A wrong code spends one attempt; a superseded code does not.
    pub fn try_consume(&mut self, transaction_id: Uuid, code: &str, now: DateTime<Utc>) -> ConsumeOutcome {
        match self.state_at(now) {
            ChallengeState::Consumed => return ConsumeOutcome::Rejected(ChallengeRejection::Consumed),
            ChallengeState::Expired => return ConsumeOutcome::Rejected(ChallengeRejection::Expired),
            ChallengeState::Live => {}
        }

        if self.transaction_id != transaction_id {
            return ConsumeOutcome::Rejected(ChallengeRejection::WrongTransaction);
        }

        if self.attempts >= MAX_ATTEMPTS {
            return ConsumeOutcome::Rejected(ChallengeRejection::AttemptsExceeded);
        }

        if !self.matches(code) {
            let superseded = self
                .superseded_code
                .as_deref()
                .map_or(false, |old| constant_time_eq(old.as_bytes(), code.as_bytes()));
            if superseded {
                return ConsumeOutcome::Rejected(ChallengeRejection::Superseded);
            }
            self.attempts += 1;
            return ConsumeOutcome::WrongCode;
        }

        self.consumed = true;
        self.consumed_at = Some(now);
        ConsumeOutcome::Consumed(self.clone())
    }
}

/// Whether `code` has the shape of an issued code (exactly six ASCII digits)
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
