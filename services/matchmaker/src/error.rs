//! Matchmaker error types

use thiserror::Error;
use types::errors::EnvelopeError;
use types::ids::{PeerId, RoomId};
use types::room::RoomStatus;

/// Errors that end a peer session
///
/// None of these are fatal to the process; at worst they end the task that
/// drives one connection.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Connection to peer {peer} is closed")]
    Connection { peer: PeerId },

    #[error("Invariant violated in room {room}: {reason}")]
    Invariant { room: RoomId, reason: String },

    #[error("Pairing engine stopped serving peer {peer}")]
    EngineStopped { peer: PeerId },

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Seat assignment errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room is no longer forming (status {status:?})")]
    NotForming { status: RoomStatus },

    #[error("Peer {peer} was not matched into this room")]
    NotMatched { peer: PeerId },

    #[error("Peer {peer} is already seated")]
    AlreadySeated { peer: PeerId },
}
