//! State management module for Connect Four rooms.
//!
//! This module provides the core state types and managers:
//!
//! - `board` - Board and rules engine (next open row, win and full checks)
//! - `game` - Per-room game: seats, turn, status, winner
//! - `room` - Room registry and broadcast policy
//! - `connection` - Connection tracking and the connection-to-room index
//! - `protocol` - Inbound/outbound wire events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          AppState                             │
//! │                                                               │
//! │  ClientEvent ──▶ ┌──────────────────────────────────────┐     │
//! │                  │             RoomManager              │     │
//! │                  │                                      │     │
//! │                  │  room_id ──▶ Room { Game { Board } } │     │
//! │                  │                                      │     │
//! │                  │  ConnectionManager                   │     │
//! │                  │  conn_id ──▶ { room_id, ... }        │     │
//! │                  └──────────────────────────────────────┘     │
//! │                                  │                            │
//! │                                  ▼                            │
//! │                    Vec<Dispatch { target, event }>            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here performs I/O. Every intent runs to completion and returns
//! the events to deliver; the caller owns delivery.

pub mod board;
pub mod connection;
pub mod game;
pub mod protocol;
pub mod room;

use chrono::{DateTime, Duration, Utc};

// Re-export commonly used types
pub use board::{check_win, is_full, next_open_row, Board, Piece, COLS, ROWS};
pub use connection::{Connection, ConnectionId, ConnectionManager};
pub use game::{Game, GameError, GameStatus, MoveOutcome, Seats, Winner};
pub use protocol::{ClientEvent, Dispatch, ProtocolError, ServerEvent, Target};
pub use room::{Room, RoomManager, RoomStats};

/// Combined application state.
///
/// Owns every room. Callers must apply one event at a time; each call
/// returns only after its mutation is complete.
#[derive(Debug, Default)]
pub struct AppState {
    pub rooms: RoomManager,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly opened connection.
    pub fn connect(&mut self, conn: ConnectionId) {
        self.rooms.connect(conn);
    }

    /// Apply a validated client event.
    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent) -> Vec<Dispatch> {
        tracing::trace!(%conn, room = event.room(), "Client event");
        match event {
            ClientEvent::Join { room } => self.rooms.join(&room, conn),
            ClientEvent::Move { room, col } => self.rooms.make_move(&room, conn, col),
            ClientEvent::Restart { room } => self.rooms.restart(&room),
        }
    }

    /// Parse, validate, and apply a raw text frame. Invalid frames are
    /// answered with a private error and change nothing.
    pub fn handle_text(&mut self, conn: ConnectionId, text: &str) -> Vec<Dispatch> {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle(conn, event),
            Err(e) => {
                tracing::debug!(%conn, error = %e, "Invalid client event");
                vec![Dispatch::to_connection(
                    conn,
                    ServerEvent::ErrorMsg(e.to_string()),
                )]
            }
        }
    }

    /// Apply a connection closing.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Dispatch> {
        self.rooms.disconnect(conn)
    }

    /// Evict rooms idle for longer than `max_idle`.
    pub fn cleanup(&mut self, now: DateTime<Utc>, max_idle: Duration) -> CleanupResult {
        CleanupResult {
            evicted_rooms: self.rooms.evict_idle(now, max_idle),
        }
    }
}

/// Result of cleanup operation.
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub evicted_rooms: Vec<String>,
}

impl CleanupResult {
    pub fn is_empty(&self) -> bool {
        self.evicted_rooms.is_empty()
    }
}
