/// Mail composition and SMTP dispatch
///
/// The relay only needs one contract from a transport: take a composed
/// message and report whether it was accepted. `SmtpMailer` is the
/// production implementation; anything else (tests, an HTTP mail API)
/// plugs in through `MailTransport`.

use async_trait::async_trait;
use folio_core::ContactMessage;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MailSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport has no credentials")]
    NotConfigured,

    #[error("invalid {field} address {value:?}")]
    Address {
        field: &'static str,
        value: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A contact message rendered into an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn compose(message: &ContactMessage, from: impl Into<String>, to: impl Into<String>) -> Self {
        let name = message.name();
        let email = message.email();
        let body = message.message();

        let text = format!("From: {} <{}>\n\n{}", name, email, body);
        let html = format!(
            concat!(
                "<div style=\"font-family:ui-sans-serif,system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Cantarell,Noto Sans,sans-serif;line-height:1.6\">\n",
                "  <h2>New portfolio message</h2>\n",
                "  <p><strong>Name:</strong> {}</p>\n",
                "  <p><strong>Email:</strong> {}</p>\n",
                "  <p style=\"white-space:pre-wrap\">{}</p>\n",
                "</div>\n"
            ),
            escape_html(name),
            escape_html(email),
            escape_html(body),
        );

        Self {
            from: from.into(),
            to: to.into(),
            reply_to: email.to_string(),
            subject: format!("New message from {}", name),
            text,
            html,
        }
    }

    /// Build the MIME message (multipart/alternative, plain text + HTML)
    pub fn to_message(&self) -> Result<Message, MailError> {
        Ok(Message::builder()
            .from(parse_mailbox("from", &self.from)?)
            .to(parse_mailbox("to", &self.to)?)
            .reply_to(Mailbox::new(None, parse_address("reply-to", &self.reply_to)?))
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))?)
    }
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, MailError> {
    value.parse::<Mailbox>().map_err(|source| MailError::Address {
        field,
        value: value.to_string(),
        source,
    })
}

/// Parse a bare address, as used for the visitor's Reply-To
pub fn parse_address(field: &'static str, value: &str) -> Result<Address, MailError> {
    value.parse::<Address>().map_err(|source| MailError::Address {
        field,
        value: value.to_string(),
        source,
    })
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Accepts a composed mail and reports whether it was handed off
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// SMTP delivery through lettre.
///
/// A fresh connection is opened for every message; nothing is pooled
/// between requests.
pub struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let credentials = self.settings.credentials().ok_or(MailError::NotConfigured)?;

        // 465 speaks TLS from the start; other ports upgrade with STARTTLS
        let builder = if self.settings.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
        };

        Ok(builder
            .port(self.settings.port)
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.password().to_string(),
            ))
            .build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = mail.to_message()?;
        let transport = self.transport()?;

        let response = transport.send(message).await?;
        tracing::debug!(
            target: "folio-relay",
            host = %self.settings.host,
            code = %response.code(),
            "smtp accepted message"
        );
        Ok(())
    }
}
