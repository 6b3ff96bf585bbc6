//! Connect Four server binary.
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Serve until terminated

use connect_four_server::{start_server, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        room_idle_timeout_secs = config.room_idle_timeout.map(|d| d.as_secs()),
        "Configuration loaded"
    );

    start_server(&config).await?;

    Ok(())
}
