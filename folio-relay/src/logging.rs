/// Process-wide log subscriber
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "folio_relay=info,folio-relay=info,tower_http=info";

/// Install the global `tracing` subscriber. Filtering honours `RUST_LOG`.
pub fn init_logging() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| format!("failed to install log subscriber: {}", err))
}
