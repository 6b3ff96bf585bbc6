//! Game state management.
//!
//! One [`Game`] lives in each room: the board, whose turn it is, the two
//! player seats, and the status/winner pair.

use super::board::{self, Board, Piece};
use super::connection::ConnectionId;

/// Game state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    /// Fewer than two players seated
    #[default]
    Waiting,
    /// Both seats taken, moves accepted
    Playing,
    /// Someone won or the board filled up
    Finished,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    /// Check if game is terminal (moves are ignored until restart).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Player(Piece),
    Draw,
}

impl Winner {
    /// Client-facing number: 0 for a draw, otherwise the player number.
    pub fn number(&self) -> u8 {
        match self {
            Self::Player(piece) => piece.number(),
            Self::Draw => 0,
        }
    }
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Play continues with the other player.
    Continue,
    /// The mover completed four in a row.
    Win(Piece),
    /// The board filled without a winner.
    Draw,
}

/// The two player seats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seats {
    pub p1: Option<ConnectionId>,
    pub p2: Option<ConnectionId>,
}

impl Seats {
    /// Both seats taken.
    pub fn is_full(&self) -> bool {
        self.p1.is_some() && self.p2.is_some()
    }

    /// Both seats free.
    pub fn is_empty(&self) -> bool {
        self.p1.is_none() && self.p2.is_none()
    }

    /// Piece played by `conn`. Seat 1 wins if the same connection holds both.
    pub fn piece_of(&self, conn: ConnectionId) -> Option<Piece> {
        if self.p1 == Some(conn) {
            Some(Piece::One)
        } else if self.p2 == Some(conn) {
            Some(Piece::Two)
        } else {
            None
        }
    }

    /// Connections currently seated, seat 1 first.
    pub fn occupants(&self) -> impl Iterator<Item = ConnectionId> {
        self.p1.into_iter().chain(self.p2)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "p1": self.p1,
            "p2": self.p2
        })
    }
}

/// Game errors.
///
/// The `Display` text of reported errors is exactly what the requester
/// receives in an `error_msg` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Room is full")]
    RoomFull,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Column is full")]
    ColumnFull,
    #[error("Room does not exist")]
    UnknownRoom,
    #[error("Game is finished")]
    GameFinished,
    #[error("Not a player in this room")]
    NotAPlayer,
}

impl GameError {
    /// Whether the requester is told about this rejection. The rest are
    /// treated as stale or duplicate messages and dropped silently.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::RoomFull | Self::NotYourTurn | Self::ColumnFull)
    }
}

/// Game session state.
#[derive(Debug, Clone, Default)]
pub struct Game {
    /// The game board
    pub board: Board,

    /// Who moves next; meaningless once finished
    pub turn: Piece,

    /// Seated connections
    pub players: Seats,

    /// Current status
    pub status: GameStatus,

    /// Present only when finished
    pub winner: Option<Winner>,
}

impl Game {
    /// Create a fresh waiting game.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a connection in the first free seat (seat 1 preferred).
    pub fn seat(&mut self, conn: ConnectionId) -> Result<Piece, GameError> {
        let piece = if self.players.p1.is_none() {
            self.players.p1 = Some(conn);
            Piece::One
        } else if self.players.p2.is_none() {
            self.players.p2 = Some(conn);
            Piece::Two
        } else {
            return Err(GameError::RoomFull);
        };

        if self.players.is_full() {
            self.status = GameStatus::Playing;
        }

        Ok(piece)
    }

    /// Apply a move by `conn` into `col`.
    pub fn play(&mut self, conn: ConnectionId, col: usize) -> Result<MoveOutcome, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameFinished);
        }

        let me = self.players.piece_of(conn).ok_or(GameError::NotAPlayer)?;

        if self.turn != me {
            return Err(GameError::NotYourTurn);
        }

        self.board.drop_piece(col, me).ok_or(GameError::ColumnFull)?;

        let outcome = if board::check_win(&self.board, me) {
            self.finish(Winner::Player(me));
            MoveOutcome::Win(me)
        } else if board::is_full(&self.board) {
            self.finish(Winner::Draw);
            MoveOutcome::Draw
        } else {
            self.turn = me.other();
            MoveOutcome::Continue
        };

        Ok(outcome)
    }

    fn finish(&mut self, winner: Winner) {
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
    }

    /// Reset the board, keeping the seated players.
    pub fn restart(&mut self) {
        self.board.clear();
        self.turn = Piece::One;
        self.winner = None;
        self.status = if self.players.is_full() {
            GameStatus::Playing
        } else {
            GameStatus::Waiting
        };
    }

    /// Clear every seat held by `conn`. Returns whether anything changed.
    ///
    /// The board and turn are left as they are; a remaining player drops the
    /// game back to waiting.
    pub fn vacate(&mut self, conn: ConnectionId) -> bool {
        let mut changed = false;
        if self.players.p1 == Some(conn) {
            self.players.p1 = None;
            changed = true;
        }
        if self.players.p2 == Some(conn) {
            self.players.p2 = None;
            changed = true;
        }
        if changed && !self.players.is_empty() {
            self.status = GameStatus::Waiting;
        }
        changed
    }

    /// Whether no one is seated.
    pub fn is_abandoned(&self) -> bool {
        self.players.is_empty()
    }

    /// Convert full game state to JSON snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "board": self.board.to_json(),
            "turn": self.turn.number(),
            "players": self.players.to_json(),
            "status": self.status.as_str()
        });
        if let Some(winner) = &self.winner {
            obj["winner"] = serde_json::json!(winner.number());
        }
        obj
    }
}
