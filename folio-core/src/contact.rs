/// Contact form payload and its validation
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// One of the three contact form inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Missing required fields")]
    MissingFields(Vec<Field>),
    #[error("Invalid email address")]
    InvalidEmail,
}

/// Whether `email` has the basic `local@domain.tld` shape
pub fn is_email_shaped(email: &str) -> bool {
    EMAIL_SHAPE_RE.is_match(email.trim())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Raw text of the form inputs, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| is_blank(self.get(*field)))
            .collect()
    }

    /// Validate into a message, leaving `self` untouched
    pub fn validate(&self) -> Result<ContactMessage, ContactError> {
        ContactMessage::new(self.name.clone(), self.email.clone(), self.message.clone())
    }
}

/// A validated contact submission.
///
/// Field values are kept verbatim; only the email is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    name: String,
    email: String,
    message: String,
}

impl ContactMessage {
    pub fn new(name: String, email: String, message: String) -> Result<Self, ContactError> {
        let fields = ContactFields {
            name,
            email,
            message,
        };

        let missing = fields.missing();
        if !missing.is_empty() {
            return Err(ContactError::MissingFields(missing));
        }
        if !is_email_shaped(&fields.email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(Self {
            name: fields.name,
            email: fields.email.trim().to_string(),
            message: fields.message,
        })
    }

    /// Build from optional parts, as decoded from a lenient request body
    pub fn from_parts(
        name: Option<String>,
        email: Option<String>,
        message: Option<String>,
    ) -> Result<Self, ContactError> {
        Self::new(
            name.unwrap_or_default(),
            email.unwrap_or_default(),
            message.unwrap_or_default(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
