//! Email delivery through an HTTP mail-send API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use pw_core::domain::entities::identity::mask_email;
use pw_core::{ChallengeNotification, NotificationSink};

use super::{render_email_body, EMAIL_SUBJECT};
use crate::config::NotificationConfig;
use crate::InfrastructureError;

/// Posts challenge emails to a SendGrid-style `mail/send` endpoint
pub struct HttpEmailNotificationSink {
    client: Client,
    endpoint: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailNotificationSink {
    pub fn new(config: &NotificationConfig, timeout: Duration) -> Result<Self, InfrastructureError> {
        if config.endpoint.is_empty() {
            return Err(InfrastructureError::Config("email API endpoint is empty".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(InfrastructureError::Config("EMAIL_API_KEY is required for http-email".to_string()));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }

    fn payload(&self, notification: &ChallengeNotification) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": notification.email }] }],
            "from": { "email": self.from_address },
            "subject": EMAIL_SUBJECT,
            "content": [{ "type": "text/plain", "value": render_email_body(notification) }],
        })
    }
}

#[async_trait]
impl NotificationSink for HttpEmailNotificationSink {
    async fn notify(&self, notification: &ChallengeNotification) -> Result<String, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(notification))
            .send()
            .await
            .map_err(|e| format!("email API unreachable: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                email = %mask_email(&notification.email),
                status = %status,
                "Email API rejected message"
            );
            return Err(format!("email API returned {}", status));
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format!("email-{}", notification.transaction_id));

        Ok(message_id)
    }
}
