/// Contact relay endpoint
///
/// POST /api/contact validates the submission, checks that the operator
/// configured a sender account, then hands one email to the transport and
/// waits for it. Failures at every stage come back as a `RelayReply`.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use folio_core::{ContactMessage, RelayReply};
use serde::Deserialize;

use crate::error::{RelayError, RelayResult};
use crate::mailer::{parse_address, OutgoingMail};
use crate::state::RelayState;

/// Request body as sent by the form; every field may be absent
#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactPayload {
    /// Decode leniently: anything that is not a JSON object of strings
    /// is treated as an empty submission.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(target: "folio-relay", error = %err, "unreadable contact body");
                Self::default()
            }
        }
    }

    /// Validate into a message whose email can be used as Reply-To
    pub fn into_message(self) -> RelayResult<ContactMessage> {
        let message = ContactMessage::from_parts(self.name, self.email, self.message)?;
        if let Err(err) = parse_address("reply-to", message.email()) {
            tracing::debug!(target: "folio-relay", error = %err, "email rejected by mail parser");
            return Err(RelayError::InvalidEmail);
        }
        Ok(message)
    }
}

pub async fn relay_contact(
    State(state): State<RelayState>,
    body: Bytes,
) -> RelayResult<Json<RelayReply>> {
    let message = ContactPayload::from_body(&body).into_message()?;

    let mail_settings = &state.settings().mail;
    if !mail_settings.is_configured() {
        return Err(RelayError::NotConfigured);
    }
    let (Some(from), Some(to)) = (mail_settings.sender(), mail_settings.recipient()) else {
        return Err(RelayError::NotConfigured);
    };

    let mail = OutgoingMail::compose(&message, from, to);
    state
        .transport()
        .send(mail)
        .await
        .map_err(RelayError::Dispatch)?;

    tracing::info!(
        target: "folio-relay",
        message_len = message.message().len(),
        "contact message relayed"
    );
    Ok(Json(RelayReply::success()))
}

pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_tolerates_garbage() {
        let bodies: [&[u8]; 5] = [b"", b"null", b"not json", b"{\"name\": 5}", b"[1,2]"];
        for body in bodies {
            let payload = ContactPayload::from_body(body);
            assert!(payload.name.is_none());
            assert!(matches!(
                payload.into_message(),
                Err(RelayError::MissingFields(_))
            ));
        }
    }

    #[test]
    fn test_payload_ignores_unknown_keys() {
        let payload = ContactPayload::from_body(
            br#"{"name":"Ada","email":"ada@example.com","message":"hi","extra":true}"#,
        );
        let message = payload.into_message().unwrap();
        assert_eq!(message.name(), "Ada");
    }

    #[test]
    fn test_payload_email_must_parse_as_address() {
        for email in ["a,b@c.de", "a(b)@c.de", "a[b]@c.de"] {
            let payload = ContactPayload {
                name: Some("Ada".to_string()),
                email: Some(email.to_string()),
                message: Some("hi".to_string()),
            };
            assert!(
                matches!(payload.into_message(), Err(RelayError::InvalidEmail)),
                "{email}"
            );
        }
    }
}
