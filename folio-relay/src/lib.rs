/// Mail relay service for the portfolio contact form
///
/// Accepts contact submissions over HTTP, validates them, and forwards
/// each one as an email to the site operator through SMTP.

pub mod config;
pub mod contact;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod server;
pub mod state;

pub use config::{ConfigError, MailSettings, RelaySettings, SmtpCredentials};
pub use error::{RelayError, RelayResult};
pub use mailer::{MailError, MailTransport, OutgoingMail, SmtpMailer};
pub use server::{create_router, serve};
pub use state::RelayState;
