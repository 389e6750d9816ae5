//! Peer-facing types: sides, join requests and the views sent back to peers

use crate::ids::{PeerId, RoomId};
use serde::{Deserialize, Serialize};

/// Seat side, assigned at match time
///
/// Wire values are the integers the clients already understand: 8 for the
/// first seat (Cho), 16 for the second seat (Han).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Get the wire code
    pub fn code(&self) -> u8 {
        match self {
            Side::First => 8,
            Side::Second => 16,
        }
    }

    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            8 => Ok(Side::First),
            16 => Ok(Side::Second),
            other => Err(format!("unknown side code {}", other)),
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        side.code()
    }
}

/// First frame a client sends after connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: PeerId,
    /// Advisory only; pairing never looks at it
    #[serde(default)]
    pub rating: i32,
    /// Opening arrangement picked by the client, carried opaquely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
}

/// A seated peer as shown in the room descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub id: PeerId,
    pub rating: i32,
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
}

impl SeatView {
    pub fn new(request: &JoinRequest, side: Side) -> Self {
        Self {
            id: request.id.clone(),
            rating: request.rating,
            side,
            formation: request.formation.clone(),
        }
    }
}

/// A peer's own view of its match, sent with the "matched" action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerView {
    pub id: PeerId,
    pub rating: i32,
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
    pub room: RoomId,
}

impl PeerView {
    pub fn new(seat: &SeatView, room: RoomId) -> Self {
        Self {
            id: seat.id.clone(),
            rating: seat.rating,
            side: seat.side,
            formation: seat.formation.clone(),
            room,
        }
    }
}
