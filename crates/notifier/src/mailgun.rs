//! Mailgun messages API sender.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use verimail_common::config::MailgunConfig;
use verimail_common::error::AppError;
use verimail_common::types::{DeliveryResponse, EmailMessage};

use crate::EmailSender;

/// Sends plain-text mail through `POST {api_base}/{domain}/messages`.
pub struct MailgunSender {
    client: Client,
    messages_url: String,
    api_key: String,
}

impl MailgunSender {
    pub fn new(config: &MailgunConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// Use a caller-provided client.
    pub fn with_client(client: Client, config: &MailgunConfig) -> Self {
        Self {
            client,
            messages_url: config.messages_url(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl EmailSender for MailgunSender {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryResponse, AppError> {
        let form = [
            ("from", message.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.text.as_str()),
        ];

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(to = %message.to, status, "Mailgun responded");

        Ok(DeliveryResponse { status, body })
    }
}
