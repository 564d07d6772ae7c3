use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use folio_core::{ContactError, Field, RelayReply};
use thiserror::Error;

use crate::mailer::MailError;

/// Every way a relay request can fail.
///
/// The `Display` text of each variant is what the caller sees; transport
/// detail stays in the source chain and only reaches the server log.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing required fields")]
    MissingFields(Vec<Field>),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Email is not configured on the server")]
    NotConfigured,

    #[error("Failed to send message")]
    Dispatch(#[source] MailError),
}

pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingFields(_) | RelayError::InvalidEmail => StatusCode::BAD_REQUEST,
            RelayError::NotConfigured | RelayError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Coarse failure category, used as a structured log field
    pub fn category(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method",
            RelayError::MissingFields(_) | RelayError::InvalidEmail => "caller",
            RelayError::NotConfigured => "configuration",
            RelayError::Dispatch(_) => "transport",
        }
    }

    fn log(&self) {
        match self {
            RelayError::MethodNotAllowed => {
                tracing::debug!(target: "folio-relay", category = self.category(), "rejected non-POST contact request");
            }
            RelayError::MissingFields(fields) => {
                let fields = fields.iter().map(Field::as_str).collect::<Vec<_>>().join(",");
                tracing::info!(target: "folio-relay", category = self.category(), %fields, "contact request missing fields");
            }
            RelayError::InvalidEmail => {
                tracing::info!(target: "folio-relay", category = self.category(), "contact request with malformed email");
            }
            RelayError::NotConfigured => {
                tracing::error!(
                    target: "folio-relay",
                    category = self.category(),
                    "SMTP_USER/SMTP_PASS are not set; contact message dropped"
                );
            }
            RelayError::Dispatch(err) => {
                tracing::error!(target: "folio-relay", category = self.category(), error = ?err, "contact mail dispatch failed: {}", err);
            }
        }
    }
}

impl From<ContactError> for RelayError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::MissingFields(fields) => RelayError::MissingFields(fields),
            ContactError::InvalidEmail => RelayError::InvalidEmail,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(RelayReply::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_and_operator_errors_are_distinct() {
        let missing = RelayError::from(ContactError::MissingFields(vec![Field::Name]));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.category(), "caller");

        let unconfigured = RelayError::NotConfigured;
        assert_eq!(unconfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unconfigured.category(), "configuration");
        assert_ne!(missing.category(), unconfigured.category());
    }

    #[test]
    fn test_display_is_caller_safe() {
        assert_eq!(RelayError::MethodNotAllowed.to_string(), "Method not allowed");
        assert_eq!(RelayError::InvalidEmail.to_string(), "Invalid email address");
        assert_eq!(
            RelayError::NotConfigured.to_string(),
            "Email is not configured on the server"
        );
        assert_eq!(
            RelayError::Dispatch(MailError::NotConfigured).to_string(),
            "Failed to send message"
        );
    }
}
