//! Game-ended sink
//!
//! The seam where finished rooms leave this service. Persistence of games and
//! rating updates live behind it.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::events::GameRecord;

#[async_trait]
pub trait GameSink: Send + Sync {
    async fn record(&self, record: GameRecord);
}

/// Logs each record and drops it.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl GameSink for LogSink {
    async fn record(&self, record: GameRecord) {
        info!(
            room = %record.room,
            peers = ?record.peers,
            outcome = ?record.outcome,
            "game record"
        );
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<GameRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<GameRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl GameSink for MemorySink {
    async fn record(&self, record: GameRecord) {
        self.records.lock().push(record);
    }
}
