use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A message as delivered by the event bus.
///
/// Only `data` matters for decoding. The rest is carried for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Base64-encoded JSON payload
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    #[serde(default)]
    pub message_id: Option<String>,

    #[serde(default)]
    pub publish_time: Option<String>,
}

impl EventEnvelope {
    /// Wrap an already-encoded payload.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Push-delivery body: the envelope plus the subscription it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    pub message: EventEnvelope,

    #[serde(default)]
    pub subscription: Option<String>,
}
