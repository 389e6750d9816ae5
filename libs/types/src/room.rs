//! Room status and the room descriptor sent with the "start" action

use crate::ids::RoomId;
use crate::peer::SeatView;
use serde::{Deserialize, Serialize};

/// Room lifecycle state
///
/// State IDs match the wire protocol. Transitions only move forward:
/// Forming → Active → Closed, or Forming → Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoomStatus {
    /// State 0: matched, waiting for both seats to acknowledge
    Forming,
    /// State 1: both seats acknowledged, moves are relayed
    Active,
    /// State 2: finished, timed out or abandoned (terminal)
    Closed,
}

impl RoomStatus {
    /// Get the state ID for wire protocol
    pub fn state_id(&self) -> u8 {
        match self {
            RoomStatus::Forming => 0,
            RoomStatus::Active => 1,
            RoomStatus::Closed => 2,
        }
    }

    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Closed)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_advance_to(&self, next: RoomStatus) -> bool {
        matches!(
            (self, next),
            (RoomStatus::Forming, RoomStatus::Active)
                | (RoomStatus::Forming, RoomStatus::Closed)
                | (RoomStatus::Active, RoomStatus::Closed)
        )
    }
}

impl TryFrom<u8> for RoomStatus {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(RoomStatus::Forming),
            1 => Ok(RoomStatus::Active),
            2 => Ok(RoomStatus::Closed),
            other => Err(format!("unknown room status {}", other)),
        }
    }
}

impl From<RoomStatus> for u8 {
    fn from(status: RoomStatus) -> Self {
        status.state_id()
    }
}

/// Snapshot of a room handed to both seats when the game starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub id: RoomId,
    pub status: RoomStatus,
    pub seats: Vec<SeatView>,
}
