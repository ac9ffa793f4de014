use crate::config::EmailConfig;
use crate::delivery::DeliveryStrategy;
use crate::Notification;
use anyhow::Context;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use shared_kernel::http_client::HttpClient;
use std::collections::HashMap;

#[derive(Serialize, Deserialize)]
struct To {
    pub email: String,
}

#[derive(Serialize, Deserialize)]
struct Message {
    pub to: To,
    pub from: String,
    pub subject: String,
    pub text: String,
}

#[derive(Serialize, Deserialize)]
struct Data {
    pub message: Message,
}

/// Sends notifications through the mail API at `email.host`.
pub struct EmailDeliveryStrategy {
    config: EmailConfig,
    server_name: String,
}

impl EmailDeliveryStrategy {
    pub fn new(config: EmailConfig, server_name: &str) -> Self {
        Self {
            config,
            server_name: server_name.trim_end_matches('/').to_owned(),
        }
    }

    fn body(&self, notification: Notification) -> Data {
        Data {
            message: Message {
                to: To {
                    email: notification.recipient,
                },
                from: self.config.from.clone(),
                subject: notification.subject,
                text: format!(
                    "{}\n\nMessage sent from {}/trains",
                    notification.body, self.server_name
                ),
            },
        }
    }
}

#[async_trait]
impl DeliveryStrategy for EmailDeliveryStrategy {
    #[tracing::instrument(err, skip(self), level = "debug")]
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        let body = serde_json::to_value(self.body(notification))
            .context("Failed to convert the body to a valid json")?;

        let auth_token = self.config.auth_token.expose_secret();
        let bearer_token = format!("Bearer {auth_token}");
        let headers = HashMap::from([("Authorization", bearer_token)]);

        HttpClient::post_json::<serde_json::Value>(self.config.host.clone(), headers, body)
            .await
            .map(|_| ())
            .context("Failed to send email")
    }
}
