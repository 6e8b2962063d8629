//! Sender that only logs. Used when `EMAIL_BACKEND=noop`.

use async_trait::async_trait;

use verimail_common::error::AppError;
use verimail_common::types::{DeliveryResponse, EmailMessage};

use crate::EmailSender;

#[derive(Debug, Clone, Default)]
pub struct NoopSender;

#[async_trait]
impl EmailSender for NoopSender {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryResponse, AppError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Noop: skipping email delivery"
        );
        Ok(DeliveryResponse {
            status: 200,
            body: "noop".to_string(),
        })
    }
}
