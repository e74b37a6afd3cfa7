//! Business services containing domain logic and use cases.

pub mod alert;
pub mod verification;

// Re-export commonly used types
pub use alert::FraudAlertService;
pub use verification::{
    ChallengeNotification, Classification, Decision, DynVerificationEngine, NotificationSink,
    ScoringOracle, VerificationEngine, VerificationEngineConfig, VerifyOutcome,
};
