/// Relay configuration, read once from the environment at startup
use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SENDER_NAME: &str = "Portfolio Contact";

/// Port on which SMTP is spoken over TLS from the first byte
pub const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Authenticated sender account
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    password: String,
}

impl SmtpCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Mail transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub credentials: Option<SmtpCredentials>,
    /// Operator address messages are delivered to
    pub to: Option<String>,
    /// Display-from mailbox
    pub from: Option<String>,
}

impl MailSettings {
    pub fn credentials(&self) -> Option<&SmtpCredentials> {
        self.credentials.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Destination mailbox, falling back to the sender account
    pub fn recipient(&self) -> Option<String> {
        self.to
            .clone()
            .or_else(|| self.credentials.as_ref().map(|c| c.user.clone()))
    }

    /// From mailbox, defaulting to a named mailbox on the sender account
    pub fn sender(&self) -> Option<String> {
        self.from.clone().or_else(|| {
            self.credentials
                .as_ref()
                .map(|c| format!("\"{}\" <{}>", DEFAULT_SENDER_NAME, c.user))
        })
    }

    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

/// Everything the relay process needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub bind_addr: SocketAddr,
    pub mail: MailSettings,
}

impl RelaySettings {
    /// Load from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr: SocketAddr = match get("FOLIO_RELAY_ADDR") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "FOLIO_RELAY_ADDR",
                value,
            })?,
            None => DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::Invalid {
                key: "FOLIO_RELAY_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })?,
        };

        let port: u16 = match get("SMTP_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "SMTP_PORT",
                value,
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let credentials = match (get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(user), Some(password)) => Some(SmtpCredentials::new(user, password)),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            mail: MailSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                credentials,
                to: get("SMTP_TO"),
                from: get("SMTP_FROM"),
            },
        })
    }
}
