//! Move events relayed between the two seats of a room
//!
//! The server never checks whether a move is legal; piece rules and check
//! detection live in the clients. A move event only carries the two squares
//! involved, the turn counter and whether the sender declared the game over.

use crate::board::Coord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The squares a piece moved between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Move {
    pub current: Coord,
    pub previous: Coord,
}

impl Move {
    pub fn rotated(self) -> Self {
        Self {
            current: self.current.rotated(),
            previous: self.previous.rotated(),
        }
    }
}

/// One frame of gameplay sent by a seat
///
/// Every field is optional on the wire; a bare `{"over": true}` is a valid
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveEvent {
    #[serde(rename = "move")]
    pub movement: Move,
    pub turn: u32,
    pub over: bool,
    pub time: Option<DateTime<Utc>>,
}

impl MoveEvent {
    /// Copy of this event as the opposing seat should see it.
    ///
    /// Both squares are rotated; a missing timestamp is filled with
    /// `received_at`.
    pub fn for_opponent(&self, received_at: DateTime<Utc>) -> Self {
        Self {
            movement: self.movement.rotated(),
            turn: self.turn,
            over: self.over,
            time: Some(self.time.unwrap_or(received_at)),
        }
    }
}
