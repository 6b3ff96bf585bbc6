//! Server lifecycle management.
//!
//! Provides [`start_server`], which spawns the hub, binds the listener, and
//! serves `WebSocket` clients until the process is terminated.

pub mod hub;
pub mod router;
pub mod ws;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;

pub use hub::{spawn_hub, EvictionPolicy, Hub, HubCommand, HubHandle};
pub use router::build_router;

/// Start the game server.
///
/// # Errors
///
/// Returns an error if the address is invalid, the TCP listener cannot
/// bind, or the server hits a fatal I/O error.
pub async fn start_server(config: &ServerConfig) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;

    let eviction = config.room_idle_timeout.map(|max_idle| EvictionPolicy {
        max_idle,
        interval: config.cleanup_interval,
    });
    let (hub, _hub_task) = spawn_hub(eviction);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Server listening");

    axum::serve(listener, build_router(hub))
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}
