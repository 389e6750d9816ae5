//! Pairing engine
//!
//! A single dispatcher task drains join requests from a bounded intake queue
//! one at a time and is the only code that ever reads or writes the waiting
//! pool. Sessions talk to it through [`PairingEngine`], a cheap clonable
//! handle around the intake sender.
//!
//! Matching never waits on a peer's socket: the "matched" notification is
//! queued on the peer's outbound link without blocking, so one stalled
//! connection cannot hold up pairing for everyone else.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::envelope::Envelope;
use types::ids::{PeerId, RoomId};
use types::peer::{JoinRequest, PeerView, SeatView, Side};

use crate::config::MatchConfig;
use crate::error::SessionError;
use crate::link::PeerLink;
use crate::pool::WaitingPool;
use crate::registry::RoomRegistry;

/// What a session learns when it is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub room: RoomId,
    pub seat: SeatView,
}

/// A join request in flight to the dispatcher
#[derive(Debug)]
pub struct JoinTicket {
    pub request: JoinRequest,
    pub link: PeerLink,
    pub reply: oneshot::Sender<Assignment>,
}

impl JoinTicket {
    pub fn peer(&self) -> &PeerId {
        &self.request.id
    }

    /// The session behind this ticket has given up or its socket is gone.
    pub fn is_stale(&self) -> bool {
        self.reply.is_closed() || self.link.is_closed()
    }
}

/// Handle for submitting join requests
#[derive(Debug, Clone)]
pub struct PairingEngine {
    intake: mpsc::Sender<JoinTicket>,
}

impl PairingEngine {
    /// Spawn the dispatcher task.
    ///
    /// The dispatcher runs until `shutdown` is cancelled or every handle is
    /// dropped.
    pub fn start(
        rooms: Arc<RoomRegistry>,
        config: &MatchConfig,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (intake, requests) = mpsc::channel(config.intake_capacity.max(1));
        let dispatcher = Dispatcher {
            requests,
            pool: WaitingPool::new(),
            rooms,
            forming_timeout: config.forming_timeout,
            matches_made: 0,
        };
        let handle = tokio::spawn(dispatcher.run(shutdown));
        (Self { intake }, handle)
    }

    /// Ask to be matched and wait until it happens.
    ///
    /// Waits for space in the intake queue, then for an opponent. Fails if
    /// the dispatcher stopped or a newer join under the same identity
    /// displaced this one.
    pub async fn join(
        &self,
        request: JoinRequest,
        link: PeerLink,
    ) -> Result<Assignment, SessionError> {
        let peer = request.id.clone();
        let (reply, assignment) = oneshot::channel();
        self.intake
            .send(JoinTicket {
                request,
                link,
                reply,
            })
            .await
            .map_err(|_| SessionError::EngineStopped { peer: peer.clone() })?;

        assignment
            .await
            .map_err(|_| SessionError::EngineStopped { peer })
    }
}

struct Dispatcher {
    requests: mpsc::Receiver<JoinTicket>,
    pool: WaitingPool,
    rooms: Arc<RoomRegistry>,
    forming_timeout: Duration,
    matches_made: u64,
}

impl Dispatcher {
    async fn run(mut self, shutdown: CancellationToken) {
        info!("pairing dispatcher started");
        loop {
            let ticket = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                ticket = self.requests.recv() => match ticket {
                    Some(ticket) => ticket,
                    None => break,
                },
            };
            self.dispatch(ticket);
        }
        info!(
            matches_made = self.matches_made,
            waiting = self.pool.len(),
            "pairing dispatcher stopped"
        );
    }

    fn dispatch(&mut self, ticket: JoinTicket) {
        let peer = ticket.peer().clone();
        debug!(%peer, "join request received");

        if self.pool.insert(ticket).is_some() {
            warn!(%peer, "identity joined again; dropping the older waiting connection");
        }

        let pruned = self.pool.prune_stale();
        if pruned > 0 {
            debug!(pruned, "dropped waiting peers that already left");
        }

        match self.pool.take_pair(&peer) {
            Some((requester, opponent)) => self.pair(requester, opponent),
            None => debug!(%peer, waiting = self.pool.len(), "no opponent yet"),
        }
    }

    /// Open a room for the pair and tell both sides.
    ///
    /// Once the room exists the match stands, even if a notification can no
    /// longer be delivered.
    fn pair(&mut self, requester: JoinTicket, opponent: JoinTicket) {
        let first = SeatView::new(&requester.request, Side::First);
        let second = SeatView::new(&opponent.request, Side::Second);
        let room = self
            .rooms
            .open([first.clone(), second.clone()], self.forming_timeout);
        self.matches_made += 1;

        info!(
            room = %room.id(),
            first = %first.id,
            second = %second.id,
            "peers matched"
        );

        notify(requester, first, room.id());
        notify(opponent, second, room.id());
    }
}

fn notify(ticket: JoinTicket, seat: SeatView, room: RoomId) {
    let JoinTicket { link, reply, .. } = ticket;
    let view = PeerView::new(&seat, room);

    if reply.send(Assignment { room, seat }).is_err() {
        warn!(peer = %link.peer(), %room, "peer left before its match was confirmed");
    }
    if let Err(err) = link.deliver_detached(&Envelope::Matched(view)) {
        warn!(peer = %link.peer(), %room, error = %err, "could not deliver match notification");
    }
}
