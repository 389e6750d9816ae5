//! Types library for the Janggi matchmaking server
//!
//! Every frame exchanged with a client, and every identifier shared between
//! the pairing engine, the room lifecycle and the relay, is defined here so
//! the services agree on one wire format.
//!
//! # Modules
//! - `ids`: Identifiers (PeerId, RoomId)
//! - `board`: Board coordinates and the seat-to-seat board transform
//! - `game`: Move events relayed between seats
//! - `peer`: Sides, join requests and per-peer views
//! - `room`: Room status and the room descriptor
//! - `envelope`: The `{action, msg}` frame codec
//! - `errors`: Error taxonomy

pub mod ids;
pub mod board;
pub mod game;
pub mod peer;
pub mod room;
pub mod envelope;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::board::*;
    pub use crate::game::*;
    pub use crate::peer::*;
    pub use crate::room::*;
    pub use crate::envelope::*;
    pub use crate::errors::*;
}
