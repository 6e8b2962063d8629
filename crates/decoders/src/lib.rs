//! Decoding of inbound registration events.
//!
//! An envelope carries a base64 payload which must hold a JSON object with
//! `uuid` and `username` (and optionally `firstName`). Any failure here aborts
//! the invocation before an email is sent or a row is written.

pub mod envelope;


use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use verimail_common::error::AppError;
use verimail_common::types::RegistrationEvent;

pub use envelope::{EventEnvelope, PushRequest};

/// Decode the registration event carried by an envelope.
pub fn decode_envelope(envelope: &EventEnvelope) -> Result<RegistrationEvent, AppError> {
    let event = decode_payload(&envelope.data)?;

    tracing::debug!(
        message_id = envelope.message_id.as_deref().unwrap_or("-"),
        uuid = %event.uuid,
        "Decoded registration event"
    );
    Ok(event)
}

/// Decode a base64 payload into a registration event.
pub fn decode_payload(data: &str) -> Result<RegistrationEvent, AppError> {
    let data = data.trim();
    if data.is_empty() {
        return Err(AppError::Decode("event payload is empty".to_string()));
    }

    let bytes = STANDARD
        .decode(data)
        .map_err(|e| AppError::Decode(format!("payload is not valid base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::Decode(format!("payload is not valid UTF-8: {}", e)))?;

    parse_event(&text)
}

/// Parse the JSON text of a registration event.
pub fn parse_event(text: &str) -> Result<RegistrationEvent, AppError> {
    let event: RegistrationEvent = serde_json::from_str(text)
        .map_err(|e| AppError::Decode(format!("invalid registration event: {}", e)))?;

    if event.username.trim().is_empty() {
        return Err(AppError::Decode("username must not be empty".to_string()));
    }

    Ok(event)
}
