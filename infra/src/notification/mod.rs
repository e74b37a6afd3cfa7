//! Notification sinks for challenge codes
//!
//! - **Log**: development sink that records a masked delivery in the log
//! - **HTTP email**: mail-send API with bearer authentication

pub mod http_email;
pub mod log_sink;

use std::sync::Arc;
use std::time::Duration;

use pw_core::{ChallengeNotification, NotificationSink};
use pw_shared::NotificationProvider;

use crate::config::NotificationConfig;
use crate::InfrastructureError;

pub use http_email::HttpEmailNotificationSink;
pub use log_sink::LogNotificationSink;

/// Build the configured notification sink
pub fn create_notification_sink(
    config: &NotificationConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn NotificationSink>, InfrastructureError> {
    match config.provider {
        NotificationProvider::Log => {
            tracing::info!("Using log notification sink");
            Ok(Arc::new(LogNotificationSink::new()))
        }
        NotificationProvider::HttpEmail => {
            tracing::info!(endpoint = %config.endpoint, "Using HTTP email notification sink");
            Ok(Arc::new(HttpEmailNotificationSink::new(config, request_timeout)?))
        }
    }
}

/// Mask a code for logs, keeping the last two digits
pub fn mask_code(code: &str) -> String {
    let visible = code.len().saturating_sub(2);
    format!("{}{}", "*".repeat(visible), &code[visible..])
}

/// Subject line of the challenge email
pub const EMAIL_SUBJECT: &str = "PayWatch - Transaction Verification Required";

/// Plain-text body of the challenge email
pub fn render_email_body(notification: &ChallengeNotification) -> String {
    let minutes = (notification.expires_in_seconds + 59) / 60;
    let amount_line = notification
        .amount
        .map(|a| format!("Amount: ${:.2}\n", a))
        .unwrap_or_default();

    format!(
        "We detected a potentially fraudulent transaction on your account.\n\
         \n\
         Your verification code is: {code}\n\
         Valid for {minutes} minutes.\n\
         \n\
         Transaction: {tx}\n\
         {amount_line}\
         \n\
         If you did not make this transaction, do not share this code and contact support.\n",
        code = notification.code,
        minutes = minutes,
        tx = notification.transaction_id,
        amount_line = amount_line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_mask_code() {
        assert_eq!(mask_code("123456"), "****56");
        assert_eq!(mask_code("1"), "1");
    }

    #[test]
    fn test_email_body() {
        let notification = ChallengeNotification {
            email: "a@example.com".to_string(),
            code: "123456".to_string(),
            amount: Some(5000.0),
            transaction_id: Uuid::nil(),
            expires_in_seconds: 300,
        };
        let body = render_email_body(&notification);
        assert!(body.contains("123456"));
        assert!(body.contains("Valid for 5 minutes"));
        assert!(body.contains("Amount: $5000.00"));
    }
}
