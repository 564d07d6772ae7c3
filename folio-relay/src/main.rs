/// Folio Relay - contact form mail relay
///
/// Configuration comes from the environment:
///   - SMTP_HOST, SMTP_PORT: mail server (default smtp.gmail.com:465)
///   - SMTP_USER, SMTP_PASS: sender account; required to relay anything
///   - SMTP_TO, SMTP_FROM: destination and display-from addresses
///   - FOLIO_RELAY_ADDR: listen address (default 0.0.0.0:3000)
///   - RUST_LOG: log filter

use anyhow::{anyhow, Context};
use folio_relay::{logging, serve, RelaySettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging().map_err(|err| anyhow!(err))?;

    let settings = RelaySettings::from_env().context("invalid relay configuration")?;
    if settings.mail.is_configured() {
        tracing::info!(
            target: "folio-relay",
            host = %settings.mail.host,
            port = settings.mail.port,
            "mail transport configured"
        );
    } else {
        tracing::warn!(
            target: "folio-relay",
            "SMTP_USER/SMTP_PASS not set; contact submissions will be refused"
        );
    }

    serve(settings).await.context("relay server failed")?;
    Ok(())
}
