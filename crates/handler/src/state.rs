//! Shared application state for the Axum handler.

use std::sync::Arc;

use verimail_common::config::AppConfig;
use verimail_engine::VerificationStore;
use verimail_notifier::EmailSender;

/// Application state shared across all route handlers via Axum `State`.
///
/// Holds only immutable configuration and the two collaborators; invocations
/// share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sender: Arc<dyn EmailSender>,
    pub store: Arc<dyn VerificationStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        sender: Arc<dyn EmailSender>,
        store: Arc<dyn VerificationStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sender,
            store,
        }
    }
}
