//! Wire messages.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Inbound events are validated here, before they reach any game logic.

use serde::Deserialize;

use super::board::COLS;

/// Validated inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join { room: String },
    Move { room: String, col: usize },
    Restart { room: String },
}

impl ClientEvent {
    /// Room the event addresses.
    pub fn room(&self) -> &str {
        match self {
            Self::Join { room } | Self::Move { room, .. } | Self::Restart { room } => room,
        }
    }

    /// Parse and validate a text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawClientEvent =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }
}

/// Inbound event as it appears on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RawClientEvent {
    Join { room: String },
    Move { room: String, col: i64 },
    Restart { room: String },
}

impl TryFrom<RawClientEvent> for ClientEvent {
    type Error = ProtocolError;

    fn try_from(raw: RawClientEvent) -> Result<Self, Self::Error> {
        match raw {
            RawClientEvent::Join { room } => Ok(Self::Join {
                room: validate_room(room)?,
            }),
            RawClientEvent::Move { room, col } => {
                let room = validate_room(room)?;
                let col = usize::try_from(col)
                    .ok()
                    .filter(|c| *c < COLS)
                    .ok_or(ProtocolError::ColumnOutOfRange(col))?;
                Ok(Self::Move { room, col })
            }
            RawClientEvent::Restart { room } => Ok(Self::Restart {
                room: validate_room(room)?,
            }),
        }
    }
}

fn validate_room(room: String) -> Result<String, ProtocolError> {
    if room.is_empty() {
        Err(ProtocolError::EmptyRoom)
    } else {
        Ok(room)
    }
}

/// Rejections raised before an event reaches the rooms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("Room id must not be empty")]
    EmptyRoom,
    #[error("Column {0} is out of range")]
    ColumnOutOfRange(i64),
}

/// Outbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Join acknowledgment with the assigned player number
    Joined { room: String, me: u8 },
    /// Full game snapshot
    State(serde_json::Value),
    /// Rejection reason, sent only to the requester
    ErrorMsg(String),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::State(_) => "state",
            Self::ErrorMsg(_) => "error_msg",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let data = match self {
            Self::Joined { room, me } => serde_json::json!({"room": room, "me": me}),
            Self::State(snapshot) => snapshot.clone(),
            Self::ErrorMsg(msg) => serde_json::json!(msg),
        };
        serde_json::json!({
            "event": self.name(),
            "data": data
        })
    }
}

/// Who an outbound event goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Only the requesting connection
    Connection(super::ConnectionId),
    /// Every connection seated in the room
    Room(String),
}

/// An outbound event with its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub target: Target,
    pub event: ServerEvent,
}

impl Dispatch {
    pub fn to_connection(conn: super::ConnectionId, event: ServerEvent) -> Self {
        Self {
            target: Target::Connection(conn),
            event,
        }
    }

    pub fn to_room(room: &str, event: ServerEvent) -> Self {
        Self {
            target: Target::Room(room.to_string()),
            event,
        }
    }
}
