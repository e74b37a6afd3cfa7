use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::fraud_alert::AlertStatus;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::transaction::TransactionStatus;
use crate::errors::DomainError;
use crate::repositories::{FraudAlertRepository, InMemoryFraudAlertRepository, TransactionRepository};
use crate::services::alert::FraudAlertService;
use crate::services::verification::tests::mocks::{alice, Harness};

fn analyst(n: u8) -> Identity {
    Identity::new(format!("analyst-{}", n), format!("analyst-{}@example.com", n))
}

#[tokio::test]
async fn test_review_flow() {
    let h = Harness::flagging();
    let decision = h.engine.score_and_decide(&alice(), Some(5000.0), Some(1000.0)).await.unwrap();
    let service = FraudAlertService::new(h.alerts.clone());

    let pending = service.pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].transaction_id, decision.transaction_id);

    let reviewed = service.review(pending[0].id, &analyst(1)).await.unwrap();
    assert_eq!(reviewed.status, AlertStatus::Reviewed);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("analyst-1@example.com"));
    assert!(service.pending(10).await.unwrap().is_empty());

    // Transaction untouched by the review
    let tx = h.ledger.find_by_id(decision.transaction_id).await.unwrap().unwrap();
    assert_eq!(tx.status, TransactionStatus::Flagged);

    let err = service.review(reviewed.id, &analyst(2)).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_review_after_verification() {
    let h = Harness::flagging();
    let decision = h.engine.score_and_decide(&alice(), Some(5000.0), Some(1000.0)).await.unwrap();
    let code = h.sink.last_code().unwrap();
    h.engine.verify(&alice(), decision.transaction_id, &code).await.unwrap();

    let service = FraudAlertService::new(h.alerts.clone());
    let alert = h.alerts.find_by_transaction(decision.transaction_id).await.unwrap().unwrap();
    let reviewed = service.review(alert.id, &analyst(1)).await.unwrap();
    assert_eq!(reviewed.status, AlertStatus::Reviewed);
}

#[tokio::test]
async fn test_review_unknown_alert() {
    let service = FraudAlertService::new(Arc::new(InMemoryFraudAlertRepository::new()));
    let err = service.review(Uuid::new_v4(), &analyst(1)).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = service.review(Uuid::new_v4(), &Identity::new("analyst-1", "")).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_pending_limit_is_clamped() {
    let service = FraudAlertService::new(Arc::new(InMemoryFraudAlertRepository::new()));
    assert!(service.pending(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_cannot_review_own_alert() {
    let h = Harness::flagging();
    let decision = h.engine.score_and_decide(&alice(), Some(5000.0), Some(1000.0)).await.unwrap();
    let service = FraudAlertService::new(h.alerts.clone());
    let alert = h.alerts.find_by_transaction(decision.transaction_id).await.unwrap().unwrap();

    let err = service.review(alert.id, &alice()).await.unwrap_err();
    assert_eq!(err, DomainError::Forbidden);

    let alert = h.alerts.find_by_id(alert.id).await.unwrap().unwrap();
    assert_eq!(alert.status, AlertStatus::Pending);
    assert!(alert.reviewed_by.is_none());
}
