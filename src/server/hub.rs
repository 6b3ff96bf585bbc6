//! The hub: a single task that owns all game state.
//!
//! WebSocket tasks never touch [`AppState`] directly. They send
//! [`HubCommand`]s over one channel, and the hub applies them strictly in
//! arrival order, so each join/move/restart/disconnect runs to completion
//! (read, mutate, deliver) before the next one starts.
//!
//! Delivery is best effort: a closed outbound channel is skipped and the
//! socket task will report the disconnect on its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::{AppState, ConnectionId, Dispatch, RoomStats, Target};

/// Per-connection sender for outbound text frames.
pub type ClientSender = mpsc::UnboundedSender<String>;

/// Command delivered to the hub.
#[derive(Debug)]
pub enum HubCommand {
    /// A socket opened.
    Connect { conn: ConnectionId, tx: ClientSender },
    /// A text frame arrived.
    Message { conn: ConnectionId, text: String },
    /// A socket closed.
    Disconnect { conn: ConnectionId },
    /// Report current counts.
    Stats { reply: oneshot::Sender<RoomStats> },
}

/// Idle-room eviction settings.
#[derive(Debug, Clone, Copy)]
pub struct EvictionPolicy {
    pub max_idle: Duration,
    pub interval: Duration,
}

/// Game state plus the outbound channel of every live connection.
#[derive(Debug, Default)]
pub struct Hub {
    state: AppState,
    clients: HashMap<ConnectionId, ClientSender>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the game state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply one command and deliver its results.
    pub fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { conn, tx } => {
                debug!(%conn, "Client connected");
                self.state.connect(conn);
                self.clients.insert(conn, tx);
            }
            HubCommand::Message { conn, text } => {
                let dispatches = self.state.handle_text(conn, &text);
                self.deliver(&dispatches);
            }
            HubCommand::Disconnect { conn } => {
                debug!(%conn, "Client disconnected");
                self.clients.remove(&conn);
                let dispatches = self.state.disconnect(conn);
                self.deliver(&dispatches);
            }
            HubCommand::Stats { reply } => {
                // Requester may have given up waiting.
                let _ = reply.send(self.state.rooms.stats());
            }
        }
    }

    /// Evict idle rooms.
    pub fn evict_idle(&mut self, max_idle: Duration) {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            warn!(?max_idle, "Idle timeout out of range, skipping cleanup");
            return;
        };
        let result = self.state.cleanup(chrono::Utc::now(), max_idle);
        let stats = self.state.rooms.stats();
        if result.is_empty() {
            debug!(
                rooms = stats.rooms,
                playing = stats.playing,
                connections = stats.connections,
                "Cleanup found nothing idle"
            );
        } else {
            info!(
                evicted = result.evicted_rooms.len(),
                rooms = stats.rooms,
                playing = stats.playing,
                connections = stats.connections,
                "Cleanup finished"
            );
        }
    }

    fn deliver(&self, dispatches: &[Dispatch]) {
        for dispatch in dispatches {
            let frame = match serde_json::to_string(&dispatch.event.to_json()) {
                Ok(f) => f,
                Err(e) => {
                    warn!(
                        event = dispatch.event.name(),
                        error = %e,
                        "Failed to serialize event"
                    );
                    continue;
                }
            };

            match &dispatch.target {
                Target::Connection(conn) => self.send(*conn, &frame),
                Target::Room(room) => {
                    for conn in self.state.rooms.members(room) {
                        self.send(conn, &frame);
                    }
                }
            }
        }
    }

    fn send(&self, conn: ConnectionId, frame: &str) {
        let Some(tx) = self.clients.get(&conn) else {
            return;
        };
        if tx.send(frame.to_string()).is_err() {
            debug!(%conn, "Outbound channel closed, dropping frame");
        }
    }

    /// Process commands until every [`HubHandle`] is dropped.
    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<HubCommand>,
        eviction: Option<EvictionPolicy>,
    ) {
        let Some(policy) = eviction else {
            while let Some(command) = rx.recv().await {
                self.apply(command);
            }
            debug!("Hub channel closed, shutting down");
            return;
        };

        let mut ticker = tokio::time::interval(policy.interval);
        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => self.apply(command),
                    None => {
                        debug!("Hub channel closed, shutting down");
                        return;
                    }
                },
                _ = ticker.tick() => self.evict_idle(policy.max_idle),
            }
        }
    }
}

/// Cloneable handle used by socket tasks to talk to the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    /// Register a new connection. Returns its id and the stream of frames
    /// to write to it.
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let conn = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.send(HubCommand::Connect { conn, tx });
        (conn, rx)
    }

    /// Forward an inbound text frame.
    pub fn message(&self, conn: ConnectionId, text: String) {
        self.send(HubCommand::Message { conn, text });
    }

    /// Report a closed connection.
    pub fn disconnect(&self, conn: ConnectionId) {
        self.send(HubCommand::Disconnect { conn });
    }

    /// Ask the hub for its current counts. `None` if the hub is gone.
    pub async fn stats(&self) -> Option<RoomStats> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Stats { reply });
        rx.await.ok()
    }

    fn send(&self, command: HubCommand) {
        if self.tx.send(command).is_err() {
            warn!("Hub is gone, dropping command");
        }
    }
}

/// Spawn the hub on a background task.
pub fn spawn_hub(eviction: Option<EvictionPolicy>) -> (HubHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = HubHandle {
        tx,
        next_id: Arc::new(AtomicU64::new(1)),
    };
    let task = tokio::spawn(Hub::new().run(rx, eviction));
    (handle, task)
}
