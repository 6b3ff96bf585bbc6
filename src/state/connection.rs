//! Connection state management.
//!
//! Tracks live connections and which rooms each one is seated in, so a
//! disconnect only touches the rooms it has to.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};

/// Server-assigned connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection state for a single client.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,

    /// When this connection was established
    pub connected_at: DateTime<Utc>,

    /// Rooms this connection holds a seat in
    rooms: BTreeSet<String>,
}

impl Connection {
    /// Create a new connection.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            connected_at: Utc::now(),
            rooms: BTreeSet::new(),
        }
    }

    /// Rooms this connection is seated in.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(String::as_str)
    }

    /// How long this connection has been open.
    pub fn session_length(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.connected_at
    }
}

/// Connection manager - reverse index from connection to rooms.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Re-registering an id keeps its room index.
    pub fn add(&mut self, id: ConnectionId) {
        self.connections
            .entry(id)
            .or_insert_with(|| Connection::new(id));
    }

    /// Record that `id` took a seat in `room`.
    pub fn bind(&mut self, id: ConnectionId, room: &str) {
        self.connections
            .entry(id)
            .or_insert_with(|| Connection::new(id))
            .rooms
            .insert(room.to_string());
    }

    /// Forget that `id` is seated in `room`.
    pub fn unbind(&mut self, id: ConnectionId, room: &str) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.rooms.remove(room);
        }
    }

    /// Remove a connection along with its room index.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// Count tracked connections.
    pub fn count(&self) -> usize {
        self.connections.len()
    }
}
