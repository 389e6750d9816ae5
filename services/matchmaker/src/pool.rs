//! Waiting pool
//!
//! Peers that asked for a match and have not been paired yet. The pool is
//! owned by the dispatcher task and is never shared, so it needs no lock.
//! Entries are kept in arrival order and scanned front to back, which makes
//! pairing first-come first-served.

use std::collections::VecDeque;

use types::ids::PeerId;

use crate::engine::JoinTicket;

#[derive(Debug, Default)]
pub struct WaitingPool {
    queue: VecDeque<JoinTicket>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ticket at the back of the queue.
    ///
    /// A ticket already waiting under the same identity is removed and
    /// returned.
    pub fn insert(&mut self, ticket: JoinTicket) -> Option<JoinTicket> {
        let displaced = self.remove(ticket.peer());
        self.queue.push_back(ticket);
        displaced
    }

    /// Remove the ticket waiting under `peer`.
    pub fn remove(&mut self, peer: &PeerId) -> Option<JoinTicket> {
        let pos = self.queue.iter().position(|t| t.peer() == peer)?;
        self.queue.remove(pos)
    }

    /// Drop tickets whose session is already gone. Returns how many.
    pub fn prune_stale(&mut self) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| !t.is_stale());
        before - self.queue.len()
    }

    /// Pull `requester` and the oldest waiting ticket with a different
    /// identity out of the pool.
    ///
    /// Returns `(requester, opponent)`, or `None` (pool unchanged) when either
    /// side is missing.
    pub fn take_pair(&mut self, requester: &PeerId) -> Option<(JoinTicket, JoinTicket)> {
        let requester_pos = self.queue.iter().position(|t| t.peer() == requester)?;
        let opponent_pos = self.queue.iter().position(|t| t.peer() != requester)?;

        // Remove the higher index first so the lower one stays valid.
        let (high, low) = if requester_pos > opponent_pos {
            (requester_pos, opponent_pos)
        } else {
            (opponent_pos, requester_pos)
        };
        let first = self.queue.remove(high)?;
        let second = self.queue.remove(low)?;

        if first.peer() == requester {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Assignment;
    use crate::link::{Outbound, PeerLink};
    use tokio::sync::{mpsc, oneshot};
    use types::peer::JoinRequest;

    struct Held {
        _outbound: mpsc::Receiver<Outbound>,
        _reply: oneshot::Receiver<Assignment>,
    }

    fn ticket(id: &str) -> (JoinTicket, Held) {
        let peer = PeerId::try_new(id).unwrap();
        let (tx, rx) = mpsc::channel(4);
        let (reply, assignment) = oneshot::channel();
        let ticket = JoinTicket {
            request: JoinRequest {
                id: peer.clone(),
                rating: 0,
                formation: None,
            },
            link: PeerLink::new(peer, tx),
            reply,
        };
        (
            ticket,
            Held {
                _outbound: rx,
                _reply: assignment,
            },
        )
    }

    fn peer(id: &str) -> PeerId {
        PeerId::try_new(id).unwrap()
    }

    #[test]
    fn test_single_peer_waits() {
        let mut pool = WaitingPool::new();
        let (t1, _h1) = ticket("u1");
        assert!(pool.insert(t1).is_none());

        assert!(pool.take_pair(&peer("u1")).is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pair_removes_both() {
        let mut pool = WaitingPool::new();
        let (t1, _h1) = ticket("u1");
        let (t2, _h2) = ticket("u2");
        pool.insert(t1);
        pool.insert(t2);

        let (requester, opponent) = pool.take_pair(&peer("u2")).unwrap();
        assert_eq!(requester.peer().as_str(), "u2");
        assert_eq!(opponent.peer().as_str(), "u1");
        assert!(pool.is_empty());
    }

    #[test]
    fn test_oldest_opponent_is_taken_first() {
        let mut pool = WaitingPool::new();
        let (t1, _h1) = ticket("u1");
        let (t2, _h2) = ticket("u2");
        let (t3, _h3) = ticket("u3");
        pool.insert(t1);
        pool.insert(t2);
        pool.insert(t3);

        let (_, opponent) = pool.take_pair(&peer("u3")).unwrap();
        assert_eq!(opponent.peer().as_str(), "u1");
        assert_eq!(pool.len(), 1);
        assert!(pool.remove(&peer("u2")).is_some());
    }

    #[test]
    fn test_same_identity_displaces() {
        let mut pool = WaitingPool::new();
        let (first, _h1) = ticket("u1");
        let (second, _h2) = ticket("u1");
        pool.insert(first);

        assert!(pool.insert(second).is_some());
        assert_eq!(pool.len(), 1);
        assert!(pool.take_pair(&peer("u1")).is_none());
    }

    #[test]
    fn test_prune_stale_drops_departed_peers() {
        let mut pool = WaitingPool::new();
        let (t1, h1) = ticket("u1");
        let (t2, _h2) = ticket("u2");
        pool.insert(t1);
        pool.insert(t2);

        drop(h1);
        assert_eq!(pool.prune_stale(), 1);
        assert!(pool.remove(&peer("u1")).is_none());
        assert!(pool.remove(&peer("u2")).is_some());
    }
}
