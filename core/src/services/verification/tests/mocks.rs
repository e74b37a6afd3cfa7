//! Mock implementations for testing the verification engine

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::identity::Identity;
use crate::domain::entities::transaction::Transaction;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{
    InMemoryChallengeStore, InMemoryFraudAlertRepository, InMemoryTransactionRepository,
    TransactionRepository,
};
use crate::services::verification::{
    ChallengeNotification, Classification, NotificationSink, ScoringOracle, VerificationEngine,
    VerificationEngineConfig,
};

// Deterministic oracle returning a preset classification
pub struct StubOracle {
    response: Mutex<Result<Classification, String>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StubOracle {
    pub fn returning(label: u8, probability: f64) -> Self {
        Self {
            response: Mutex::new(Ok(Classification { label, probability })),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Mutex::new(Err(message.to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(0, 0.01)
        }
    }

    pub fn set(&self, label: u8, probability: f64) {
        *self.response.lock().unwrap() = Ok(Classification { label, probability });
    }
}

#[async_trait]
impl ScoringOracle for StubOracle {
    async fn classify(&self, _amount: f64, _time: f64) -> Result<Classification, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}

// Sink that records every notification it is handed
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<ChallengeNotification>>,
    pub should_fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.should_fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|n| n.code.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: &ChallengeNotification) -> Result<String, String> {
        // Recorded even on failure so tests can read the code that was issued
        self.sent.lock().unwrap().push(notification.clone());
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("mail relay unavailable".to_string());
        }
        Ok(format!("mock-msg-{}", Uuid::new_v4()))
    }
}

// Ledger whose `mark_verified` can be made to fail
#[derive(Default)]
pub struct FlakyLedger {
    pub inner: InMemoryTransactionRepository,
    pub fail_mark_verified: AtomicBool,
}

#[async_trait]
impl TransactionRepository for FlakyLedger {
    async fn create(&self, transaction: Transaction) -> DomainResult<Transaction> {
        self.inner.create(transaction).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Transaction>> {
        self.inner.find_by_id(id).await
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<Transaction> {
        if self.fail_mark_verified.load(Ordering::SeqCst) {
            return Err(DomainError::storage("connection reset"));
        }
        self.inner.mark_verified(id, at).await
    }
}

pub type TestEngine = VerificationEngine<
    FlakyLedger,
    InMemoryFraudAlertRepository,
    InMemoryChallengeStore,
    StubOracle,
    RecordingSink,
>;

pub struct Harness {
    pub engine: Arc<TestEngine>,
    pub ledger: Arc<FlakyLedger>,
    pub alerts: Arc<InMemoryFraudAlertRepository>,
    pub challenges: Arc<InMemoryChallengeStore>,
    pub oracle: Arc<StubOracle>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new(oracle: StubOracle, sink: RecordingSink) -> Self {
        Self::with_config(oracle, sink, VerificationEngineConfig::default())
    }

    pub fn with_config(oracle: StubOracle, sink: RecordingSink, config: VerificationEngineConfig) -> Self {
        let ledger = Arc::new(FlakyLedger::default());
        let alerts = Arc::new(InMemoryFraudAlertRepository::new());
        let challenges = Arc::new(InMemoryChallengeStore::new());
        let oracle = Arc::new(oracle);
        let sink = Arc::new(sink);
        let engine = Arc::new(VerificationEngine::new(
            ledger.clone(),
            alerts.clone(),
            challenges.clone(),
            oracle.clone(),
            sink.clone(),
            config,
        ));

        Self {
            engine,
            ledger,
            alerts,
            challenges,
            oracle,
            sink,
        }
    }

    /// Harness whose oracle flags every transaction
    pub fn flagging() -> Self {
        Self::new(StubOracle::returning(1, 0.93), RecordingSink::new())
    }
}

pub fn alice() -> Identity {
    Identity::new("user-alice", "alice@example.com")
}

pub fn bob() -> Identity {
    Identity::new("user-bob", "bob@example.com")
}

/// A six-digit code guaranteed to differ from `code`
pub fn other_code(code: &str) -> String {
    if code == "000000" {
        "111111".to_string()
    } else {
        "000000".to_string()
    }
}
