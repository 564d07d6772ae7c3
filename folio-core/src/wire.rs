/// JSON body shared by the relay endpoint and its clients
use serde::{Deserialize, Serialize};

/// Default path of the relay endpoint
pub const CONTACT_PATH: &str = "/api/contact";

/// Reply body of every relay response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    pub ok: bool,

    /// Safe-to-display failure text, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayReply {
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}
