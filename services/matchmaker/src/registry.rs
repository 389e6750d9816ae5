//! Active-room index
//!
//! Maps room id → room for every room that is Forming or Active. Sessions
//! look rooms up by id instead of holding on to them across phases, so a room
//! that closes underneath a session is simply gone on the next lookup.
//!
//! Closing goes through the registry: whoever wins the room's closing
//! transition removes it from the index and emits its [`GameRecord`].

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tracing::info;
use types::ids::RoomId;
use types::peer::SeatView;

use crate::events::{GameRecord, Outcome};
use crate::room::Room;
use crate::sink::GameSink;

pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<Room>>,
    sink: Arc<dyn GameSink>,
}

impl RoomRegistry {
    pub fn new(sink: Arc<dyn GameSink>) -> Self {
        Self {
            rooms: DashMap::new(),
            sink,
        }
    }

    /// Create and index a Forming room for a matched pair, and arm its
    /// Forming deadline.
    pub fn open(self: &Arc<Self>, roster: [SeatView; 2], forming_timeout: Duration) -> Arc<Room> {
        let room = Arc::new(Room::new(roster, forming_timeout));
        self.rooms.insert(room.id(), room.clone());

        let registry: Weak<Self> = Arc::downgrade(self);
        let id = room.id();
        let deadline = room.deadline();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(registry) = registry.upgrade() {
                registry.expire(&id);
            }
        });

        room
    }

    pub fn get(&self, id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Close a room that is still Forming at its deadline.
    ///
    /// Returns true if this call closed it.
    pub fn expire(&self, id: &RoomId) -> bool {
        let Some(room) = self.get(id) else {
            return false;
        };
        let Some(ready) = room.expire() else {
            return false;
        };
        self.rooms.remove(id);

        let ready = ready.into_iter().map(|s| s.id).collect::<Vec<_>>();
        info!(room = %id, ready = ?ready, "room timed out while forming");
        self.publish(GameRecord::new(&room, Outcome::Rematch { ready }));
        true
    }

    /// Close a room with the given outcome.
    ///
    /// Exactly one caller per room gets true; everyone else finds the room
    /// already closed.
    pub fn finish(&self, id: &RoomId, outcome: Outcome) -> bool {
        let Some(room) = self.get(id) else {
            return false;
        };
        if !room.close(outcome.notice()) {
            return false;
        }
        self.rooms.remove(id);

        info!(room = %id, outcome = ?outcome, "room closed");
        self.publish(GameRecord::new(&room, outcome));
        true
    }

    fn publish(&self, record: GameRecord) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            sink.record(record).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use types::ids::PeerId;
    use types::peer::Side;
    use types::room::RoomStatus;

    fn seat(id: &str, side: Side) -> SeatView {
        SeatView {
            id: PeerId::try_new(id).unwrap(),
            rating: 0,
            side,
            formation: None,
        }
    }

    fn roster() -> [SeatView; 2] {
        [seat("u1", Side::First), seat("u2", Side::Second)]
    }

    fn registry() -> (Arc<RoomRegistry>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Arc::new(RoomRegistry::new(sink.clone())), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_forming_room_expires_at_deadline() {
        let (registry, sink) = registry();
        let room = registry.open(roster(), Duration::from_secs(10));
        assert!(registry.get(&room.id()).is_some());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(room.status(), RoomStatus::Forming);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(room.status(), RoomStatus::Closed);
        assert!(registry.is_empty());

        tokio::task::yield_now().await;
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Outcome::Rematch { ready: vec![] });
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_emits_one_record() {
        let (registry, sink) = registry();
        let room = registry.open(roster(), Duration::from_secs(10));
        let u1 = PeerId::try_new("u1").unwrap();

        assert!(registry.finish(
            &room.id(),
            Outcome::Finished { reported_by: u1.clone(), turn: 7 }
        ));
        assert!(!registry.finish(&room.id(), Outcome::Abandoned { by: u1 }));
        assert!(!registry.expire(&room.id()));
        assert!(registry.get(&room.id()).is_none());

        tokio::task::yield_now().await;
        assert_eq!(sink.records().len(), 1);

        // The deadline firing later finds nothing to do.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_of_unknown_room() {
        let (registry, _sink) = registry();
        assert!(registry.get(&RoomId::new()).is_none());
        assert!(!registry.finish(
            &RoomId::new(),
            Outcome::Rematch { ready: vec![] }
        ));
    }
}
