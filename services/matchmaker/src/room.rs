//! Room lifecycle
//!
//! A room is created by the dispatcher when two peers are matched. It knows
//! the matched roster from the start, but its two seats stay empty until each
//! peer acknowledges the match. Both seated peers race to fill the seats, so
//! the seat array sits behind a lock that is only held for the check-and-set;
//! no network I/O ever happens under it.
//!
//! Status is published on a `watch` channel so sessions can wait for the
//! room to become Active or Closed without polling.
//!
//! Becoming Active and being started are separate steps. The session whose
//! acknowledgment filled the room queues "start" on both seats and only then
//! marks the room started; the other seat waits for that mark before it
//! relays anything, so no seat sees a move ahead of its own "start".

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use types::envelope::EndNotice;
use types::ids::{PeerId, RoomId};
use types::peer::SeatView;
use types::room::{RoomDescriptor, RoomStatus};

use crate::error::RoomError;
use crate::link::PeerLink;

/// A peer that acknowledged its match
#[derive(Debug, Clone)]
pub struct SeatedPeer {
    pub seat: SeatView,
    pub link: PeerLink,
}

/// Result of a successful acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formation {
    /// The other seat is still empty
    Waiting,
    /// This acknowledgment filled the last seat
    Active,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    roster: [SeatView; 2],
    deadline: Instant,
    seats: Mutex<[Option<SeatedPeer>; 2]>,
    end_notice: Mutex<Option<EndNotice>>,
    status: watch::Sender<RoomStatus>,
    started: watch::Sender<bool>,
}

impl Room {
    /// Create a Forming room for a matched pair.
    ///
    /// The Forming deadline starts counting now.
    pub fn new(roster: [SeatView; 2], forming_timeout: Duration) -> Self {
        let (status, _) = watch::channel(RoomStatus::Forming);
        let (started, _) = watch::channel(false);
        Self {
            id: RoomId::new(),
            roster,
            deadline: Instant::now() + forming_timeout,
            seats: Mutex::new([None, None]),
            end_notice: Mutex::new(None),
            status,
            started,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The two peers matched into this room, seated or not.
    pub fn roster(&self) -> &[SeatView; 2] {
        &self.roster
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn status(&self) -> RoomStatus {
        *self.status.borrow()
    }

    /// Why the room closed, once it has.
    pub fn end_notice(&self) -> Option<EndNotice> {
        *self.end_notice.lock()
    }

    /// Seat a peer that acknowledged the match.
    ///
    /// Filling the second seat moves the room to Active.
    pub fn acknowledge(&self, seated: SeatedPeer) -> Result<Formation, RoomError> {
        let peer = seated.seat.id.clone();
        let mut seats = self.seats.lock();

        let status = self.status();
        if status != RoomStatus::Forming {
            return Err(RoomError::NotForming { status });
        }
        if !self.roster.iter().any(|s| s.id == peer) {
            return Err(RoomError::NotMatched { peer });
        }
        if seats.iter().flatten().any(|s| s.seat.id == peer) {
            return Err(RoomError::AlreadySeated { peer });
        }

        // Roster membership plus the duplicate check guarantee a free seat.
        if let Some(slot) = seats.iter_mut().find(|s| s.is_none()) {
            *slot = Some(seated);
        }

        if seats.iter().all(Option::is_some) {
            self.advance(RoomStatus::Active);
            Ok(Formation::Active)
        } else {
            Ok(Formation::Waiting)
        }
    }

    /// Free the seat of a peer that left while the room was still Forming.
    ///
    /// Returns false if the room had already moved on.
    pub fn vacate(&self, peer: &PeerId) -> bool {
        let mut seats = self.seats.lock();
        if self.status() != RoomStatus::Forming {
            return false;
        }
        for slot in seats.iter_mut() {
            if slot.as_ref().is_some_and(|s| &s.seat.id == peer) {
                *slot = None;
            }
        }
        true
    }

    /// Close a room whose Forming deadline passed.
    ///
    /// Returns the seats that did acknowledge, or `None` if the room was no
    /// longer Forming.
    pub fn expire(&self) -> Option<Vec<SeatView>> {
        let seats = self.seats.lock();
        if self.status() != RoomStatus::Forming {
            return None;
        }
        *self.end_notice.lock() = Some(EndNotice::RoomTimeout);
        self.advance(RoomStatus::Closed);
        Some(seats.iter().flatten().map(|s| s.seat.clone()).collect())
    }

    /// Close the room. Only the first caller wins; later calls return false.
    pub fn close(&self, notice: EndNotice) -> bool {
        let _seats = self.seats.lock();
        if self.status().is_terminal() {
            return false;
        }
        *self.end_notice.lock() = Some(notice);
        self.advance(RoomStatus::Closed)
    }

    fn advance(&self, next: RoomStatus) -> bool {
        self.status.send_if_modified(|status| {
            if status.can_advance_to(next) {
                *status = next;
                true
            } else {
                false
            }
        })
    }

    /// Record that "start" is queued on both seats.
    pub fn mark_started(&self) {
        self.started.send_replace(true);
    }

    /// Wait until the game is started or the room closes first.
    ///
    /// Returns true if the room was started, even if it has since closed.
    pub async fn started(&self) -> bool {
        let mut started = self.started.subscribe();
        let mut status = self.status.subscribe();
        let outcome = tokio::select! {
            biased;
            result = started.wait_for(|s| *s) => result.is_ok(),
            _ = status.wait_for(|s| s.is_terminal()) => false,
        };
        outcome
    }

    /// Wait until the room is Closed.
    pub async fn closed(&self) {
        let mut rx = self.status.subscribe();
        let _ = rx.wait_for(|s| s.is_terminal()).await;
    }

    pub fn seated(&self) -> Vec<SeatedPeer> {
        self.seats.lock().iter().flatten().cloned().collect()
    }

    /// Link to the other seat, if `peer` is seated here and the other seat is
    /// filled.
    pub fn opponent_of(&self, peer: &PeerId) -> Option<PeerLink> {
        let seats = self.seats.lock();
        if !seats.iter().flatten().any(|s| &s.seat.id == peer) {
            return None;
        }
        seats
            .iter()
            .flatten()
            .find(|s| &s.seat.id != peer)
            .map(|s| s.link.clone())
    }

    /// Descriptor for the "start" frame. `None` if a seat is empty.
    pub fn descriptor(&self) -> Option<RoomDescriptor> {
        let seats = self.seats.lock();
        let mut views = seats
            .iter()
            .map(|s| s.as_ref().map(|s| s.seat.clone()))
            .collect::<Option<Vec<_>>>()?;
        views.sort_by_key(|s| s.side.code());
        Some(RoomDescriptor {
            id: self.id,
            status: self.status(),
            seats: views,
        })
    }
}
