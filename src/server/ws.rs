//! `WebSocket` handler for game clients.
//!
//! Clients connect to `GET /ws`. Each text frame is forwarded to the hub;
//! every frame the hub addresses to this connection is written back. When
//! the socket closes for any reason the hub is told, which frees the
//! connection's seats.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::debug;

use super::hub::HubHandle;

/// Upgrade an HTTP request to a `WebSocket` game connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_game(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, hub))
}

async fn handle_ws(mut socket: WebSocket, hub: HubHandle) {
    let (conn, mut outbound) = hub.connect();
    debug!(%conn, "WebSocket client connected");

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    debug!(%conn, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        hub.message(conn, text.as_str().to_owned());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%conn, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%conn, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(%conn, "WebSocket error: {e}");
                        break;
                    }
                    // Binary and pong frames carry no game events.
                    _ => {}
                }
            }
        }
    }

    hub.disconnect(conn);
}
