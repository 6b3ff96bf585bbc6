//! Room state management.
//!
//! A room is an isolated game keyed by a client-chosen string. Rooms are
//! created by the first join and destroyed when the last seated player
//! leaves. [`RoomManager`] applies client intents and decides what gets
//! sent to whom; it never does I/O itself.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::connection::{ConnectionId, ConnectionManager};
use super::game::{Game, GameError, GameStatus, MoveOutcome};
use super::protocol::{Dispatch, ServerEvent};

/// Room state.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room key as sent by clients
    pub id: String,

    /// The room's game
    pub game: Game,

    /// When room was created
    pub created_at: DateTime<Utc>,

    /// Last accepted intent
    pub last_activity: DateTime<Utc>,
}

impl Room {
    /// Create a room holding a fresh waiting game.
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            game: Game::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Whether the room has seen no accepted intent for longer than `max_idle`.
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        now - self.last_activity > max_idle
    }

    /// Distinct connections seated in this room.
    pub fn members(&self) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self.game.players.occupants().collect();
        members.dedup();
        members
    }

    /// How long the room has existed.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    fn state_event(&self) -> ServerEvent {
        ServerEvent::State(self.game.to_json())
    }
}

/// Point-in-time counts for logging and the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoomStats {
    pub rooms: usize,
    pub playing: usize,
    pub connections: usize,
}

/// Room manager - owns every room and the connection-to-room index.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<String, Room>,
    connections: ConnectionManager,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a room.
    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Connections that receive a room broadcast.
    pub fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(Room::members)
            .unwrap_or_default()
    }

    /// Register a newly opened connection.
    pub fn connect(&mut self, conn: ConnectionId) {
        self.connections.add(conn);
    }

    /// Seat `conn` in `room_id`, creating the room if needed.
    pub fn join(&mut self, room_id: &str, conn: ConnectionId) -> Vec<Dispatch> {
        if !self.rooms.contains_key(room_id) {
            self.rooms
                .insert(room_id.to_string(), Room::new(room_id.to_string()));
            info!(room = room_id, rooms = self.rooms.len(), "Room created");
        }
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };

        let me = match room.game.seat(conn) {
            Ok(piece) => piece,
            Err(e) => {
                debug!(room = room_id, %conn, error = %e, "Join rejected");
                return reject(conn, e);
            }
        };

        room.touch();
        self.connections.bind(conn, room_id);
        info!(room = room_id, %conn, me = %me, status = room.game.status.as_str(), "Player joined");

        vec![
            Dispatch::to_connection(
                conn,
                ServerEvent::Joined {
                    room: room_id.to_string(),
                    me: me.number(),
                },
            ),
            Dispatch::to_room(room_id, room.state_event()),
        ]
    }

    /// Drop `conn`'s piece into `col` in `room_id`.
    pub fn make_move(&mut self, room_id: &str, conn: ConnectionId, col: usize) -> Vec<Dispatch> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!(room = room_id, %conn, "Move for unknown room ignored");
            return reject(conn, GameError::UnknownRoom);
        };

        match room.game.play(conn, col) {
            Ok(outcome) => {
                room.touch();
                match outcome {
                    MoveOutcome::Continue => {
                        debug!(room = room_id, %conn, col, "Move accepted");
                    }
                    MoveOutcome::Win(piece) => {
                        info!(room = room_id, winner = %piece, "Game won");
                    }
                    MoveOutcome::Draw => {
                        info!(room = room_id, "Game drawn");
                    }
                }
                vec![Dispatch::to_room(room_id, room.state_event())]
            }
            Err(e) => {
                debug!(room = room_id, %conn, col, error = %e, "Move rejected");
                reject(conn, e)
            }
        }
    }

    /// Reset the board in `room_id`.
    pub fn restart(&mut self, room_id: &str) -> Vec<Dispatch> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!(room = room_id, "Restart for unknown room ignored");
            return Vec::new();
        };

        room.game.restart();
        room.touch();
        info!(room = room_id, status = room.game.status.as_str(), "Game restarted");

        vec![Dispatch::to_room(room_id, room.state_event())]
    }

    /// Vacate every seat `conn` holds. Rooms left empty are destroyed; the
    /// rest go back to waiting and the remaining player is told.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Dispatch> {
        let Some(connection) = self.connections.remove(conn) else {
            return Vec::new();
        };

        let now = Utc::now();
        debug!(
            conn = %connection.id,
            session_secs = connection.session_length(now).num_seconds(),
            seats = connection.rooms().count(),
            "Connection closed"
        );

        let mut dispatches = Vec::new();
        for room_id in connection.rooms() {
            let Some(room) = self.rooms.get_mut(room_id) else {
                continue;
            };

            if !room.game.vacate(conn) {
                continue;
            }

            if room.game.is_abandoned() {
                let age_secs = room.age(now).num_seconds();
                self.rooms.remove(room_id);
                info!(
                    room = room_id,
                    %conn,
                    age_secs,
                    rooms = self.rooms.len(),
                    "Room destroyed"
                );
            } else {
                info!(room = room_id, %conn, "Player left");
                dispatches.push(Dispatch::to_room(room_id, room.state_event()));
            }
        }

        dispatches
    }

    /// Destroy rooms idle for longer than `max_idle`. Returns their ids.
    pub fn evict_idle(&mut self, now: DateTime<Utc>, max_idle: Duration) -> Vec<String> {
        let idle: Vec<String> = self
            .rooms
            .values()
            .filter(|r| r.is_idle(now, max_idle))
            .map(|r| r.id.clone())
            .collect();

        for id in &idle {
            if let Some(room) = self.rooms.remove(id) {
                for conn in room.members() {
                    self.connections.unbind(conn, id);
                }
                info!(room = %id, age_secs = room.age(now).num_seconds(), "Idle room evicted");
            }
        }

        idle
    }

    /// Count rooms with a game in progress.
    pub fn playing_count(&self) -> usize {
        self.rooms
            .values()
            .filter(|r| r.game.status == GameStatus::Playing)
            .count()
    }

    /// Total room count.
    pub fn count(&self) -> usize {
        self.rooms.len()
    }

    /// Room, game and connection counts.
    pub fn stats(&self) -> RoomStats {
        RoomStats {
            rooms: self.count(),
            playing: self.playing_count(),
            connections: self.connections.count(),
        }
    }
}

/// Private error for reported rejections, nothing for silent ones.
fn reject(conn: ConnectionId, error: GameError) -> Vec<Dispatch> {
    if error.is_reported() {
        vec![Dispatch::to_connection(
            conn,
            ServerEvent::ErrorMsg(error.to_string()),
        )]
    } else {
        Vec::new()
    }
}
