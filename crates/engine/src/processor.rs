//! Verification pipeline.
//!
//! Two explicit steps joined by a named intermediate result:
//! 1. `dispatch` composes and sends the email, yielding a `DispatchOutcome`
//! 2. `record` writes the send time, but only for `DispatchOutcome::Delivered`
//!
//! Nothing spans the two steps. If `record` fails after a delivery, the user
//! has the email but no row exists; the error is returned and logged.

use chrono::{DateTime, Utc};

use verimail_common::config::AppConfig;
use verimail_common::error::AppError;
use verimail_common::types::{RegistrationEvent, VerificationRecord};
use verimail_notifier::{EmailSender, compose_verification_email};

use crate::store::VerificationStore;

/// Result of the send step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Provider answered 200.
    Delivered { to: String, status: u16 },
    /// Provider answered anything else. Not retried.
    Rejected { status: u16, message: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}

/// Result of a whole invocation that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Recorded(VerificationRecord),
    EmailRejected { status: u16, message: String },
}

/// Step 1: compose the verification email and submit it once.
pub async fn dispatch(
    config: &AppConfig,
    sender: &dyn EmailSender,
    event: &RegistrationEvent,
) -> Result<DispatchOutcome, AppError> {
    let message = compose_verification_email(config, event);
    let response = sender.send(&message).await?;

    if response.is_success() {
        tracing::info!(uuid = %event.uuid, to = %message.to, "Email sent to {}", message.to);
        Ok(DispatchOutcome::Delivered {
            to: message.to,
            status: response.status,
        })
    } else {
        tracing::warn!(
            uuid = %event.uuid,
            status = response.status,
            message = %response.body,
            "Failed to send email"
        );
        Ok(DispatchOutcome::Rejected {
            status: response.status,
            message: response.body,
        })
    }
}

/// Step 2: record the send time at `now`, for delivered emails only.
pub async fn record(
    store: &dyn VerificationStore,
    event: &RegistrationEvent,
    outcome: &DispatchOutcome,
    now: DateTime<Utc>,
) -> Result<ProcessOutcome, AppError> {
    match outcome {
        DispatchOutcome::Rejected { status, message } => Ok(ProcessOutcome::EmailRejected {
            status: *status,
            message: message.clone(),
        }),
        DispatchOutcome::Delivered { .. } => {
            let record = VerificationRecord {
                id: event.uuid,
                username: event.username.clone(),
                email_exp_time: now.naive_utc(),
            };

            if let Err(e) = store.upsert(&record).await {
                tracing::error!(
                    uuid = %event.uuid,
                    error = %e,
                    "Verification email was sent but its send time was not recorded"
                );
                return Err(e);
            }

            Ok(ProcessOutcome::Recorded(record))
        }
    }
}

/// Run both steps for one registration event.
pub async fn process_registration(
    config: &AppConfig,
    sender: &dyn EmailSender,
    store: &dyn VerificationStore,
    event: &RegistrationEvent,
) -> Result<ProcessOutcome, AppError> {
    let outcome = dispatch(config, sender, event).await?;
    record(store, event, &outcome, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use uuid::Uuid;

    use verimail_common::types::{DeliveryResponse, EmailMessage};

    use super::*;
    use crate::memory::InMemoryVerificationStore;

    const UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    /// Answers every send with a fixed status and remembers what it was given.
    struct FakeSender {
        status: u16,
        body: &'static str,
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl FakeSender {
        fn answering(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for FakeSender {
        async fn send(&self, message: &EmailMessage) -> Result<DeliveryResponse, AppError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(DeliveryResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    /// Fails the way reqwest does before any response arrives.
    struct UnreachableSender;

    #[async_trait]
    impl EmailSender for UnreachableSender {
        async fn send(&self, _message: &EmailMessage) -> Result<DeliveryResponse, AppError> {
            let err = reqwest::Client::new()
                .post("http://[::1")
                .build()
                .expect_err("malformed URL must not build");
            Err(AppError::Email(err))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl VerificationStore for BrokenStore {
        async fn upsert(&self, _record: &VerificationRecord) -> Result<(), AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn config() -> AppConfig {
        let env = HashMap::from([
            ("MAILGUN_DOMAIN", "mg.example.com"),
            ("MAILGUN_API_KEY", "key"),
            ("MAILGUN_SENDER_EMAIL", "noreply@example.com"),
            ("DB_USERNAME", "webapp"),
            ("VERIFICATION_BASE_URL", "http://example.com:8080"),
        ]);
        AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap()
    }

    fn event(first_name: Option<&str>) -> RegistrationEvent {
        RegistrationEvent::new(
            UUID.parse().unwrap(),
            "a@b.com",
            first_name.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_delivered_email_is_recorded_once() {
        let sender = FakeSender::answering(200, "Queued");
        let store = InMemoryVerificationStore::new();

        let outcome = process_registration(&config(), &sender, &store, &event(Some("Ann")))
            .await
            .unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert!(sent[0].text.contains("Hello Ann,"));
        assert!(sent[0].text.contains(
            "/v1/user/verify_email?token=3fa85f64-5717-4562-b3fc-2c963f66afa6"
        ));

        assert_eq!(store.writes(), 1);
        let stored = store.get(UUID.parse().unwrap()).unwrap();
        assert_eq!(
            stored.id_bytes().to_vec(),
            hex::decode("3fa85f6457174562b3fc2c963f66afa6").unwrap()
        );
        assert_eq!(stored.username, "a@b.com");
        assert!(matches!(outcome, ProcessOutcome::Recorded(r) if r == stored));
    }

    #[tokio::test]
    async fn test_missing_first_name_gives_empty_greeting() {
        let sender = FakeSender::answering(200, "Queued");
        let store = InMemoryVerificationStore::new();

        process_registration(&config(), &sender, &store, &event(None))
            .await
            .unwrap();

        assert!(sender.sent()[0].text.starts_with("Hello ,\n"));
    }

    #[tokio::test]
    async fn test_rejected_email_skips_write_without_error() {
        let sender = FakeSender::answering(400, "'to' parameter is not a valid address");
        let store = InMemoryVerificationStore::new();

        let outcome = process_registration(&config(), &sender, &store, &event(Some("Ann")))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ProcessOutcome::EmailRejected {
                status: 400,
                message: "'to' parameter is not a valid address".to_string(),
            }
        );
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_non_200_success_codes_are_rejections() {
        let sender = FakeSender::answering(202, "Accepted");
        let outcome = dispatch(&config(), &sender, &event(None)).await.unwrap();
        assert!(!outcome.is_delivered());
    }

    #[tokio::test]
    async fn test_transport_failure_skips_write() {
        let store = InMemoryVerificationStore::new();

        let result = process_registration(&config(), &UnreachableSender, &store, &event(None)).await;

        assert!(matches!(result, Err(AppError::Email(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_resend_keeps_single_record_with_latest_time() {
        let store = InMemoryVerificationStore::new();
        let delivered = DispatchOutcome::Delivered {
            to: "a@b.com".to_string(),
            status: 200,
        };
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();

        record(&store, &event(None), &delivered, first).await.unwrap();
        record(&store, &event(None), &delivered, second).await.unwrap();

        let id: Uuid = UUID.parse().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().email_exp_time, second.naive_utc());
    }

    #[tokio::test]
    async fn test_store_failure_after_delivery_is_surfaced() {
        let sender = FakeSender::answering(200, "Queued");

        let outcome = dispatch(&config(), &sender, &event(None)).await.unwrap();
        assert!(outcome.is_delivered());

        let result = record(&BrokenStore, &event(None), &outcome, Utc::now()).await;

        // The email went out even though nothing was written.
        assert_eq!(sender.sent().len(), 1);
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
