//! Verification email composition and delivery.
//!
//! Delivery goes through the `EmailSender` trait so the pipeline can run
//! against Mailgun in production and an in-memory fake in tests. There is
//! no retry: one call, one answer.

pub mod mailgun;
pub mod noop;

use async_trait::async_trait;
use verimail_common::config::AppConfig;
use verimail_common::error::AppError;
use verimail_common::types::{DeliveryResponse, EmailMessage, RegistrationEvent};

pub use mailgun::MailgunSender;
pub use noop::NoopSender;

/// Path of the verification endpoint, relative to the configured base URL.
pub const VERIFY_EMAIL_PATH: &str = "/v1/user/verify_email";

/// Subject line of every verification email.
pub const VERIFICATION_SUBJECT: &str = "Please verify your email";

/// Outbound email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Submit a message. Transport failures are errors; any HTTP answer,
    /// including a rejection, is returned as a `DeliveryResponse`.
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryResponse, AppError>;
}

/// Build the verification link. The token is embedded unmodified.
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!(
        "{}{}?token={}",
        base_url.trim_end_matches('/'),
        VERIFY_EMAIL_PATH,
        token
    )
}

/// Plain-text body. A missing first name leaves the greeting empty.
pub fn verification_body(first_name: Option<&str>, link: &str) -> String {
    format!(
        "Hello {},\nPlease click on the link to verify your email: {}",
        first_name.unwrap_or(""),
        link
    )
}

/// Compose the verification email for a registration event.
pub fn compose_verification_email(config: &AppConfig, event: &RegistrationEvent) -> EmailMessage {
    let link = verification_link(&config.verification_base_url, &event.token);

    EmailMessage {
        from: config.mailgun.sender_email.clone(),
        to: event.username.clone(),
        subject: VERIFICATION_SUBJECT.to_string(),
        text: verification_body(event.first_name.as_deref(), &link),
    }
}
