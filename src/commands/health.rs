//! Relay health check command.
//!
//! Probes the configured relay endpoint with a GET and reports whether it is
//! reachable. A 405 counts as healthy: the route exists, it just only serves
//! POST uploads.

use crate::config::DictoConfig;
use crate::transcription::api::probe_relay_health;

/// Probes the relay endpoint and prints the outcome.
pub async fn handle_health() -> anyhow::Result<()> {
    let config = DictoConfig::load()?;

    tracing::info!("Probing relay at {}", config.relay.url);

    match probe_relay_health(&config.relay.url).await {
        Ok(()) => {
            println!("Relay at {} is healthy", config.relay.url);
            Ok(())
        }
        Err(err) => Err(anyhow::anyhow!("Relay at {}: {err}", config.relay.url)),
    }
}
