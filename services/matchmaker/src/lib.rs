//! Matchmaker Service
//!
//! Pairs anonymous peers into two-seat rooms and relays moves between the
//! seats of each room. Game rules are never checked here; the server only
//! moves coordinate pairs and the game-over flag between clients.
//!
//! **Key Invariants:**
//! - The waiting pool is touched by the dispatcher task only
//! - No identity is seated in more than one room per match
//! - Room status only moves forward (Forming → Active → Closed)
//! - A move reaches the opposing seat before the sender's next move is read
//!
//! # Architecture
//!
//! ```text
//!   peer session ──join──▶ intake (bounded) ──▶ Dispatcher ──▶ WaitingPool
//!        │                                         │
//!        │◀──────── Assignment + "matched" ────────┘
//!        │                                         │ open
//!        │                                    RoomRegistry ──▶ deadline timer
//!        │──"done"──▶ Room::acknowledge             │
//!        │                                         │ close
//!        └──moves──▶ relay ──"move"──▶ opponent     └──▶ GameSink
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod link;
pub mod pool;
pub mod engine;
pub mod room;
pub mod registry;
pub mod sink;
pub mod relay;
pub mod session;
pub mod service;

pub use config::MatchConfig;
pub use engine::PairingEngine;
pub use error::{RoomError, SessionError};
pub use link::{Outbound, PeerLink};
pub use registry::RoomRegistry;
pub use service::Matchmaker;
pub use session::{run_peer, SessionEnd};
pub use sink::{GameSink, LogSink, MemorySink};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
