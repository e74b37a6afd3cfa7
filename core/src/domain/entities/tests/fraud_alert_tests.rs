//! Unit tests for the fraud alert entity

use chrono::Utc;

use crate::domain::entities::fraud_alert::{AlertSeverity, AlertStatus, FraudAlert};
use crate::domain::entities::identity::Identity;
use crate::domain::entities::transaction::{FraudScore, Transaction, Verdict};
use crate::errors::DomainError;

fn flagged(score: f64) -> Transaction {
    Transaction::new(
        &Identity::new("user-1", "user@example.com"),
        5000.0,
        1000.0,
        Verdict::Fraudulent,
        FraudScore::new(score).unwrap(),
        Utc::now(),
    )
}

#[test]
fn test_alert_for_transaction() {
    let tx = flagged(0.93);
    let alert = FraudAlert::for_transaction(&tx, Utc::now());

    assert_eq!(alert.transaction_id, tx.id);
    assert_eq!(alert.identity_id, "user-1");
    assert_eq!(alert.status, AlertStatus::Pending);
    assert_eq!(alert.severity, AlertSeverity::Critical);
    assert!(alert.reason.contains("93.00%"));
}

#[test]
fn test_severity_thresholds() {
    let sev = |p| AlertSeverity::from_score(FraudScore::new(p).unwrap());
    assert_eq!(sev(0.81), AlertSeverity::Critical);
    assert_eq!(sev(0.8), AlertSeverity::High);
    assert_eq!(sev(0.61), AlertSeverity::High);
    assert_eq!(sev(0.6), AlertSeverity::Medium);
    assert_eq!(sev(0.3), AlertSeverity::Medium);
}

#[test]
fn test_review_once() {
    let mut alert = FraudAlert::for_transaction(&flagged(0.7), Utc::now());
    let at = Utc::now();

    alert.review("analyst-7", at).unwrap();
    assert_eq!(alert.status, AlertStatus::Reviewed);
    assert_eq!(alert.reviewed_by.as_deref(), Some("analyst-7"));
    assert_eq!(alert.reviewed_at, Some(at));

    let err = alert.review("analyst-8", Utc::now()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { .. }));
    assert_eq!(alert.reviewed_by.as_deref(), Some("analyst-7"));
}

#[test]
fn test_review_requires_reviewer() {
    let mut alert = FraudAlert::for_transaction(&flagged(0.7), Utc::now());
    assert!(alert.review("  ", Utc::now()).is_err());
    assert!(alert.is_pending());
}
