use std::sync::Arc;

use crate::config::RelaySettings;
use crate::mailer::MailTransport;

/// Application state shared across all HTTP handlers.
///
/// Both halves are read-only after startup.
#[derive(Clone)]
pub struct RelayState {
    settings: Arc<RelaySettings>,
    transport: Arc<dyn MailTransport>,
}

impl RelayState {
    pub fn new(settings: RelaySettings, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn transport(&self) -> &Arc<dyn MailTransport> {
        &self.transport
    }
}
