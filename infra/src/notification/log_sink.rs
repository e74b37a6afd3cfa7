//! Development notification sink
//!
//! Records each delivery in the log with the code masked, instead of sending it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use pw_core::domain::entities::identity::mask_email;
use pw_core::{ChallengeNotification, NotificationSink};

use super::mask_code;

#[derive(Clone, Default)]
pub struct LogNotificationSink {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
}

impl LogNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Make every following delivery fail
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, notification: &ChallengeNotification) -> Result<String, String> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            tracing::warn!(
                email = %mask_email(&notification.email),
                "Simulated notification failure"
            );
            return Err("simulated delivery failure".to_string());
        }

        let message_id = format!("log-{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            email = %mask_email(&notification.email),
            code = %mask_code(&notification.code),
            transaction_id = %notification.transaction_id,
            expires_in_seconds = notification.expires_in_seconds,
            message_id = %message_id,
            event = "notification_logged",
            "Challenge notification (log sink)"
        );

        Ok(message_id)
    }
}
