//! Event structures for rooms leaving the active index
//!
//! One [`GameRecord`] is emitted per room, at the moment it closes. Storage
//! and rating updates happen downstream of the [`GameSink`](crate::sink::GameSink).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::envelope::EndNotice;
use types::ids::{PeerId, RoomId};

use crate::room::Room;

/// How a room ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// A seat sent a move with the over flag set
    Finished { reported_by: PeerId, turn: u32 },
    /// A seat's connection dropped mid-game
    Abandoned { by: PeerId },
    /// The Forming deadline passed; `ready` peers acknowledged and may be
    /// matched again
    Rematch { ready: Vec<PeerId> },
}

impl Outcome {
    /// The "end" payload seats see for this outcome
    pub fn notice(&self) -> EndNotice {
        match self {
            Outcome::Finished { .. } => EndNotice::GameOver,
            Outcome::Abandoned { .. } => EndNotice::OpponentLeft,
            Outcome::Rematch { .. } => EndNotice::RoomTimeout,
        }
    }
}

/// Game ended event, consumed by persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub room: RoomId,
    /// Matched peers, First seat then Second seat
    pub peers: Vec<PeerId>,
    /// Ratings as carried at join time, same order as `peers`
    pub ratings: Vec<i32>,
    pub outcome: Outcome,
    pub closed_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(room: &Room, outcome: Outcome) -> Self {
        Self {
            room: room.id(),
            peers: room.roster().iter().map(|s| s.id.clone()).collect(),
            ratings: room.roster().iter().map(|s| s.rating).collect(),
            outcome,
            closed_at: Utc::now(),
        }
    }
}
