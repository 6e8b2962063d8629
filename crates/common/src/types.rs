use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A newly registered user, decoded from an inbound event payload.
///
/// Lives for a single invocation only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRegistrationEvent")]
pub struct RegistrationEvent {
    /// User identifier, used for the stored key.
    pub uuid: Uuid,
    /// The identifier exactly as published. Embedded in the verification link.
    pub token: String,
    /// Login name, which doubles as the destination email address.
    pub username: String,
    /// Optional display name used in the greeting.
    pub first_name: Option<String>,
}

impl RegistrationEvent {
    /// Build an event whose token is the canonical hyphenated uuid.
    pub fn new(uuid: Uuid, username: impl Into<String>, first_name: Option<String>) -> Self {
        Self {
            uuid,
            token: uuid.hyphenated().to_string(),
            username: username.into(),
            first_name,
        }
    }
}

/// Wire shape of a registration event.
#[derive(Debug, Deserialize)]
struct RawRegistrationEvent {
    uuid: String,
    username: String,
    #[serde(rename = "firstName", default)]
    first_name: Option<String>,
}

impl TryFrom<RawRegistrationEvent> for RegistrationEvent {
    type Error = uuid::Error;

    fn try_from(raw: RawRegistrationEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            uuid: Uuid::parse_str(&raw.uuid)?,
            token: raw.uuid,
            username: raw.username,
            first_name: raw.first_name,
        })
    }
}

/// A row of `verification_info`: when the verification email was last sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub username: String,
    /// UTC send time. Stored in a `DATETIME` column, hence naive.
    pub email_exp_time: NaiveDateTime,
}

impl VerificationRecord {
    /// Raw 16-byte form of the id, as stored in the `BINARY(16)` key column.
    pub fn id_bytes(&self) -> [u8; 16] {
        *self.id.as_bytes()
    }
}

/// Provider-neutral plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// What the email provider answered. Status and body are the only outcome signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub status: u16,
    pub body: String,
}

impl DeliveryResponse {
    /// Only an exact 200 counts as delivered.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_event_deserializes_camel_case_first_name() {
        let event: RegistrationEvent = serde_json::from_str(
            r#"{"uuid":"3fa85f64-5717-4562-b3fc-2c963f66afa6","username":"a@b.com","firstName":"Ann"}"#,
        )
        .unwrap();
        assert_eq!(event.username, "a@b.com");
        assert_eq!(event.first_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_registration_event_first_name_optional() {
        let event: RegistrationEvent = serde_json::from_str(
            r#"{"uuid":"3fa85f64-5717-4562-b3fc-2c963f66afa6","username":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(event.first_name, None);
    }

    #[test]
    fn test_registration_event_keeps_published_token() {
        let event: RegistrationEvent = serde_json::from_str(
            r#"{"uuid":"3FA85F64-5717-4562-B3FC-2C963F66AFA6","username":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(event.token, "3FA85F64-5717-4562-B3FC-2C963F66AFA6");
        assert_eq!(event.uuid.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn test_id_bytes_is_unhexed_uuid() {
        let record = VerificationRecord {
            id: "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().unwrap(),
            username: "a@b.com".to_string(),
            email_exp_time: chrono::Utc::now().naive_utc(),
        };
        assert_eq!(
            record.id_bytes(),
            [
                0x3f, 0xa8, 0x5f, 0x64, 0x57, 0x17, 0x45, 0x62, 0xb3, 0xfc, 0x2c, 0x96, 0x3f,
                0x66, 0xaf, 0xa6
            ]
        );
    }

    #[test]
    fn test_delivery_success_requires_exact_200() {
        let ok = DeliveryResponse {
            status: 200,
            body: String::new(),
        };
        let accepted = DeliveryResponse {
            status: 202,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!accepted.is_success());
    }
}
