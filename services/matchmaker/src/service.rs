//! Process-scoped matchmaker state
//!
//! Built once at startup and cloned into every connection handler. Owns the
//! pairing engine handle, the active-room index and the shutdown token that
//! stops the dispatcher.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::MatchConfig;
use crate::engine::PairingEngine;
use crate::registry::RoomRegistry;
use crate::sink::GameSink;

#[derive(Clone)]
pub struct Matchmaker {
    engine: PairingEngine,
    rooms: Arc<RoomRegistry>,
    config: MatchConfig,
    shutdown: CancellationToken,
}

impl Matchmaker {
    /// Start the dispatcher. The returned handle resolves once it has
    /// stopped after [`Matchmaker::shutdown`] is cancelled.
    pub fn start(config: MatchConfig, sink: Arc<dyn GameSink>) -> (Self, JoinHandle<()>) {
        let rooms = Arc::new(RoomRegistry::new(sink));
        let shutdown = CancellationToken::new();
        let (engine, handle) = PairingEngine::start(rooms.clone(), &config, shutdown.clone());

        info!(
            forming_timeout_ms = config.forming_timeout.as_millis() as u64,
            intake_capacity = config.intake_capacity,
            "matchmaker started"
        );

        (
            Self {
                engine,
                rooms,
                config,
                shutdown,
            },
            handle,
        )
    }

    pub fn engine(&self) -> &PairingEngine {
        &self.engine
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
