//! Connect Four Server Library
//!
//! Real-time two-player Connect Four: clients join rooms by name over a
//! `WebSocket`, take turns dropping pieces, and receive the authoritative
//! board after every change.
//!
//! # Overview
//!
//! - **State** ([`state`]) - Pure, transport-free game logic: the 6x7 rules
//!   engine, per-room games, the room registry with its broadcast policy,
//!   and the wire protocol. Every intent returns the events to deliver.
//!
//! - **Server** ([`server`]) - Axum `WebSocket` endpoint and a single hub
//!   task that owns all state and applies events one at a time.
//!
//! - **Config** ([`config`]) - Environment-driven settings.
//!
//! # Example
//!
//! ```rust
//! use connect_four_server::state::{AppState, ClientEvent, ConnectionId, ServerEvent};
//!
//! let mut app = AppState::new();
//! let (x, y) = (ConnectionId(1), ConnectionId(2));
//!
//! app.handle(x, ClientEvent::Join { room: "A".into() });
//! let out = app.handle(y, ClientEvent::Join { room: "A".into() });
//! assert_eq!(out[0].event, ServerEvent::Joined { room: "A".into(), me: 2 });
//!
//! // Player 2 moving first is rejected privately
//! let out = app.handle(y, ClientEvent::Move { room: "A".into(), col: 3 });
//! assert_eq!(out[0].event, ServerEvent::ErrorMsg("Not your turn".into()));
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::start_server;
pub use state::*;
