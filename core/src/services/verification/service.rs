//! Verification engine implementation

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::challenge::{is_well_formed_code, Challenge, ConsumeOutcome};
use crate::domain::entities::fraud_alert::FraudAlert;
use crate::domain::entities::identity::{mask_email, Identity};
use crate::domain::entities::transaction::{FraudScore, Transaction, TransactionStatus, Verdict};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{ChallengeStore, FraudAlertRepository, TransactionRepository};

use super::config::VerificationEngineConfig;
use super::traits::{NotificationSink, ScoringOracle};
use super::types::{ChallengeNotification, Decision, VerifyOutcome};

/// Engine over trait objects, for backends chosen at runtime
pub type DynVerificationEngine = VerificationEngine<
    dyn TransactionRepository,
    dyn FraudAlertRepository,
    dyn ChallengeStore,
    dyn ScoringOracle,
    dyn NotificationSink,
>;

/// Orchestrates scoring, challenge issuance, code verification and status
/// reconciliation over the ledger, the alert log and the challenge store.
pub struct VerificationEngine<T, A, C, O, N>
where
    T: TransactionRepository + ?Sized,
    A: FraudAlertRepository + ?Sized,
    C: ChallengeStore + ?Sized,
    O: ScoringOracle + ?Sized,
    N: NotificationSink + ?Sized,
{
    transactions: Arc<T>,
    alerts: Arc<A>,
    challenges: Arc<C>,
    oracle: Arc<O>,
    notifier: Arc<N>,
    config: VerificationEngineConfig,
}

impl<T, A, C, O, N> VerificationEngine<T, A, C, O, N>
where
    T: TransactionRepository + ?Sized,
    A: FraudAlertRepository + ?Sized,
    C: ChallengeStore + ?Sized,
    O: ScoringOracle + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(
        transactions: Arc<T>,
        alerts: Arc<A>,
        challenges: Arc<C>,
        oracle: Arc<O>,
        notifier: Arc<N>,
        config: VerificationEngineConfig,
    ) -> Self {
        Self {
            transactions,
            alerts,
            challenges,
            oracle,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &VerificationEngineConfig {
        &self.config
    }

    /// Score a transaction and decide whether its owner must be challenged
    ///
    /// Invalid input and classifier failures return before anything is
    /// persisted. When the verdict is fraudulent this also records a fraud
    /// alert, issues a challenge (replacing any earlier one for the identity)
    /// and dispatches the code. A failed dispatch is reported in
    /// `notification_delivered` and rolls nothing back.
    pub async fn score_and_decide(
        &self,
        identity: &Identity,
        amount: Option<f64>,
        time: Option<f64>,
    ) -> DomainResult<Decision> {
        let amount = require_number("amount", amount)?;
        if amount < 0.0 {
            return Err(DomainError::invalid_input("amount", "must not be negative"));
        }
        let time = require_number("time", time)?;

        let (verdict, fraud_score) = self.classify(amount, time).await?;

        let now = Utc::now();
        let transaction = self
            .transactions
            .create(Transaction::new(identity, amount, time, verdict, fraud_score, now))
            .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            identity_id = %identity.id,
            verdict = verdict.label(),
            fraud_score = fraud_score.value(),
            status = %transaction.status,
            event = "transaction_scored",
            "Transaction scored"
        );

        if !verdict.is_fraudulent() {
            return Ok(Decision {
                transaction_id: transaction.id,
                verdict,
                fraud_score,
                requires_challenge: false,
                notification_delivered: None,
            });
        }

        let alert = self.alerts.create(FraudAlert::for_transaction(&transaction, now)).await?;
        tracing::info!(
            alert_id = %alert.id,
            transaction_id = %transaction.id,
            severity = %alert.severity,
            event = "fraud_alert_created",
            "Fraud alert created"
        );

        let notification = self.issue_challenge(identity, &transaction, now).await?;
        let delivered = self.dispatch(&notification).await.is_ok();

        Ok(Decision {
            transaction_id: transaction.id,
            verdict,
            fraud_score,
            requires_challenge: true,
            notification_delivered: Some(delivered),
        })
    }

    /// Verify a challenge code and approve the transaction it was issued for
    ///
    /// The checks run in this order: code shape, transaction existence,
    /// ownership, then one atomic consume on the challenge store. A forbidden
    /// or malformed attempt never touches the challenge.
    pub async fn verify(
        &self,
        identity: &Identity,
        transaction_id: Uuid,
        code: &str,
    ) -> DomainResult<VerifyOutcome> {
        if !is_well_formed_code(code) {
            return Err(DomainError::invalid_input("otp", "verification code must be 6 digits"));
        }

        let transaction = self.owned_transaction(identity, transaction_id).await?;

        let now = Utc::now();
        let outcome = self
            .challenges
            .consume(&identity.email, transaction.id, code, now)
            .await?;

        match outcome {
            ConsumeOutcome::Consumed(challenge) => {
                let verified_at = challenge.consumed_at.unwrap_or(now);
                tracing::info!(
                    transaction_id = %transaction.id,
                    email = %mask_email(&identity.email),
                    event = "challenge_consumed",
                    "Challenge consumed"
                );

                // Challenge is spent; a failed write here is finished by reconcile on next read
                let updated = self
                    .transactions
                    .mark_verified(transaction.id, verified_at)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            transaction_id = %transaction.id,
                            error = %e,
                            event = "ledger_update_failed",
                            "Failed to record verification after consuming challenge"
                        );
                        DomainError::storage(format!("failed to record verification: {}", e))
                    })?;

                Ok(VerifyOutcome {
                    transaction_id: updated.id,
                    verified: updated.verified,
                    status: updated.status,
                    verified_at: updated.verified_at,
                })
            }
            ConsumeOutcome::Rejected(reason) => {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    email = %mask_email(&identity.email),
                    reason = %reason,
                    event = "challenge_rejected",
                    "No live challenge for transaction"
                );
                Err(DomainError::ChallengeNotFound)
            }
            ConsumeOutcome::WrongCode => {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    email = %mask_email(&identity.email),
                    event = "challenge_wrong_code",
                    "Verification code mismatch"
                );
                Err(DomainError::InvalidCode)
            }
        }
    }

    /// Issue a fresh code for a flagged transaction that is still unverified
    ///
    /// The new challenge replaces the previous one before dispatch and is kept
    /// even when delivery fails. Returns whether the notification went out.
    pub async fn resend(&self, identity: &Identity, transaction_id: Uuid) -> DomainResult<bool> {
        let transaction = self.owned_transaction(identity, transaction_id).await?;
        let transaction = self.reconcile(transaction).await?;

        if !transaction.awaiting_verification() {
            return Err(DomainError::invalid_input(
                "transaction_id",
                "transaction does not require verification",
            ));
        }

        let notification = self.issue_challenge(identity, &transaction, Utc::now()).await?;
        Ok(self.dispatch(&notification).await.is_ok())
    }

    /// Ownership-checked read of a single transaction, reconciled with the challenge store
    pub async fn transaction(&self, identity: &Identity, transaction_id: Uuid) -> DomainResult<Transaction> {
        let transaction = self.owned_transaction(identity, transaction_id).await?;
        self.reconcile(transaction).await
    }

    /// Drop expired challenge records
    pub async fn purge_expired_challenges(&self) -> DomainResult<usize> {
        let removed = self.challenges.purge_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::debug!(removed = removed, event = "challenges_purged", "Purged expired challenges");
        }
        Ok(removed)
    }

    async fn classify(&self, amount: f64, time: f64) -> DomainResult<(Verdict, FraudScore)> {
        let classification =
            match tokio::time::timeout(self.config.oracle_timeout, self.oracle.classify(amount, time)).await {
                Ok(Ok(classification)) => classification,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, event = "oracle_failed", "Scoring oracle call failed");
                    return Err(DomainError::oracle_unavailable(e));
                }
                Err(_) => {
                    tracing::error!(
                        timeout_ms = self.config.oracle_timeout.as_millis() as u64,
                        event = "oracle_timeout",
                        "Scoring oracle timed out"
                    );
                    return Err(DomainError::oracle_unavailable("scoring oracle timed out"));
                }
            };

        let verdict = Verdict::from_label(classification.label).ok_or_else(|| {
            DomainError::oracle_unavailable(format!("unexpected label {}", classification.label))
        })?;
        let score = FraudScore::new(classification.probability).ok_or_else(|| {
            DomainError::oracle_unavailable(format!(
                "probability {} outside [0, 1]",
                classification.probability
            ))
        })?;

        Ok((verdict, score))
    }

    async fn owned_transaction(&self, identity: &Identity, transaction_id: Uuid) -> DomainResult<Transaction> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("transaction"))?;

        if !transaction.is_owned_by(identity) {
            tracing::warn!(
                transaction_id = %transaction_id,
                identity_id = %identity.id,
                event = "cross_identity_access",
                "Transaction requested by another identity"
            );
            return Err(DomainError::Forbidden);
        }

        Ok(transaction)
    }

    /// Finish an approval whose ledger write did not land after the challenge was consumed
    async fn reconcile(&self, transaction: Transaction) -> DomainResult<Transaction> {
        if transaction.status != TransactionStatus::Flagged || transaction.verified {
            return Ok(transaction);
        }

        match self.challenges.find(&transaction.identity_email).await? {
            Some(challenge) => self.apply_consumed(transaction, &challenge).await,
            None => Ok(transaction),
        }
    }

    /// Settle the identity's consumed record against the ledger before a new
    /// challenge overwrites it
    async fn settle_previous(&self, identity_email: &str) -> DomainResult<()> {
        let previous = match self.challenges.find(identity_email).await? {
            Some(c) if c.consumed => c,
            _ => return Ok(()),
        };

        if let Some(transaction) = self.transactions.find_by_id(previous.transaction_id).await? {
            self.apply_consumed(transaction, &previous).await?;
        }
        Ok(())
    }

    async fn apply_consumed(&self, transaction: Transaction, challenge: &Challenge) -> DomainResult<Transaction> {
        let pending = transaction.status == TransactionStatus::Flagged && !transaction.verified;
        if !pending || !challenge.consumed || challenge.transaction_id != transaction.id {
            return Ok(transaction);
        }

        let verified_at: DateTime<Utc> = challenge.consumed_at.unwrap_or(challenge.created_at);
        tracing::info!(
            transaction_id = %transaction.id,
            event = "transaction_reconciled",
            "Applied verification from consumed challenge"
        );
        self.transactions.mark_verified(transaction.id, verified_at).await
    }

    async fn issue_challenge(
        &self,
        identity: &Identity,
        transaction: &Transaction,
        now: DateTime<Utc>,
    ) -> DomainResult<ChallengeNotification> {
        self.settle_previous(&identity.email).await?;

        let challenge = Challenge::issue_with_ttl(
            identity.email.clone(),
            transaction.id,
            now,
            self.config.challenge_ttl_seconds,
        );
        let notification = ChallengeNotification {
            email: identity.email.clone(),
            code: challenge.code.clone(),
            amount: Some(transaction.amount),
            transaction_id: transaction.id,
            expires_in_seconds: challenge.remaining_seconds(now),
        };

        self.challenges.issue(challenge).await?;
        tracing::info!(
            transaction_id = %transaction.id,
            email = %mask_email(&identity.email),
            event = "challenge_issued",
            "Challenge issued"
        );

        Ok(notification)
    }

    async fn dispatch(&self, notification: &ChallengeNotification) -> DomainResult<String> {
        let result = tokio::time::timeout(
            self.config.notification_timeout,
            self.notifier.notify(notification),
        )
        .await;

        let error = match result {
            Ok(Ok(message_id)) => {
                tracing::info!(
                    transaction_id = %notification.transaction_id,
                    message_id = %message_id,
                    event = "notification_sent",
                    "Challenge notification sent"
                );
                return Ok(message_id);
            }
            Ok(Err(e)) => e,
            Err(_) => "notification dispatch timed out".to_string(),
        };

        tracing::warn!(
            transaction_id = %notification.transaction_id,
            email = %mask_email(&notification.email),
            error = %error,
            event = "notification_failed",
            "Challenge notification not delivered"
        );
        Err(DomainError::NotificationFailed { message: error })
    }
}

fn require_number(field: &str, value: Option<f64>) -> DomainResult<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(DomainError::invalid_input(field, "must be a finite number")),
        None => Err(DomainError::invalid_input(field, "is required")),
    }
}
