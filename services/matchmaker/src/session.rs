//! Per-connection session driver
//!
//! Walks one peer through join → matched → ready → start → relay. The caller
//! owns the socket: it feeds inbound text frames in as a stream and drains the
//! outbound queue into the socket from a separate writer task.

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use types::envelope::{decode_join, is_ready_ack, EndNotice, Envelope};

use crate::engine::Assignment;
use crate::error::{RoomError, SessionError};
use crate::link::{Outbound, PeerLink};
use crate::registry::RoomRegistry;
use crate::relay;
use crate::room::{Formation, Room, SeatedPeer};
use crate::service::Matchmaker;

/// How a session finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer's connection closed
    Disconnected,
    /// The room never became Active
    TimedOut,
    /// The game ended and the peer was told why
    Ended(EndNotice),
}

/// Drive one connection until its game ends or it drops.
///
/// Frames that fail to decode are logged and skipped. Errors are returned
/// only for conditions that end this session; the process and other rooms are
/// unaffected.
pub async fn run_peer<S>(
    matchmaker: &Matchmaker,
    outbound: mpsc::Sender<Outbound>,
    mut inbound: S,
) -> Result<SessionEnd, SessionError>
where
    S: Stream<Item = String> + Unpin,
{
    let request = loop {
        let Some(text) = inbound.next().await else {
            return Ok(SessionEnd::Disconnected);
        };
        match decode_join(&text) {
            Ok(request) => break request,
            Err(err) => warn!(error = %err, "dropping malformed join frame"),
        }
    };

    let peer = request.id.clone();
    let link = PeerLink::new(peer.clone(), outbound);
    debug!(%peer, rating = request.rating, "peer joined");

    let assignment = {
        let join = matchmaker.engine().join(request, link.clone());
        tokio::pin!(join);
        loop {
            tokio::select! {
                biased;
                assignment = &mut join => break assignment?,
                frame = inbound.next() => match frame {
                    Some(_) => debug!(%peer, "ignoring frame while waiting for an opponent"),
                    None => {
                        debug!(%peer, "peer left the waiting pool");
                        return Ok(SessionEnd::Disconnected);
                    }
                },
            }
        }
    };

    let rooms = matchmaker.rooms();
    let Some(room) = rooms.get(&assignment.room) else {
        debug!(%peer, room = %assignment.room, "room closed before the peer could see it");
        return Ok(SessionEnd::TimedOut);
    };

    // The oneshot is fulfilled before "matched" is queued, so a "done" can
    // only be read here after the peer has seen its match.
    loop {
        tokio::select! {
            biased;
            _ = room.closed() => {
                info!(%peer, room = %room.id(), "room closed before the peer was ready");
                return Ok(SessionEnd::TimedOut);
            }
            frame = inbound.next() => match frame {
                Some(text) if is_ready_ack(&text) => break,
                Some(_) => debug!(%peer, "ignoring frame while waiting for ready"),
                None => return Ok(SessionEnd::Disconnected),
            },
        }
    }

    match take_seat(&room, rooms, &link, &assignment, &mut inbound).await? {
        Seated::Filled => {
            if let Some(end) = announce_start(&room, rooms, &link).await? {
                return Ok(end);
            }
        }
        Seated::Started => {}
        Seated::Left(end) => return Ok(end),
    }
    info!(%peer, room = %room.id(), side = assignment.seat.side.code(), "game started");

    match relay::run(&room, rooms, &link, &mut inbound).await {
        Ok(end) => Ok(end),
        Err(err) => {
            relay::abandon(&room, rooms, &peer);
            Err(err)
        }
    }
}

/// Where a seat stands once both peers have acknowledged, or why it never
/// got there.
enum Seated {
    /// This acknowledgment filled the room; "start" is ours to send
    Filled,
    /// The other seat filled the room and queued our "start"
    Started,
    Left(SessionEnd),
}

/// Acknowledge the match and wait for the game to start.
async fn take_seat<S>(
    room: &Room,
    rooms: &RoomRegistry,
    link: &PeerLink,
    assignment: &Assignment,
    inbound: &mut S,
) -> Result<Seated, SessionError>
where
    S: Stream<Item = String> + Unpin,
{
    let peer = link.peer();
    let seated = SeatedPeer {
        seat: assignment.seat.clone(),
        link: link.clone(),
    };

    match room.acknowledge(seated) {
        Ok(Formation::Active) => return Ok(Seated::Filled),
        Ok(Formation::Waiting) => debug!(%peer, room = %room.id(), "seated, waiting for opponent"),
        Err(RoomError::NotForming { .. }) => {
            return Ok(Seated::Left(closed_before_start(room, link).await))
        }
        Err(err) => {
            return Err(SessionError::Invariant {
                room: room.id(),
                reason: err.to_string(),
            })
        }
    }

    let started = loop {
        tokio::select! {
            biased;
            started = room.started() => break started,
            frame = inbound.next() => match frame {
                Some(_) => debug!(%peer, "ignoring frame while the room is forming"),
                None => {
                    // Too late to vacate means the room went Active under us.
                    if !room.vacate(peer) {
                        relay::abandon(room, rooms, peer);
                    }
                    return Ok(Seated::Left(SessionEnd::Disconnected));
                }
            },
        }
    };

    if started {
        Ok(Seated::Started)
    } else {
        Ok(Seated::Left(closed_before_start(room, link).await))
    }
}

/// Queue "start" on both seats, then release the other seat into its relay.
///
/// Returns `Some(end)` if our own connection is already gone.
async fn announce_start(
    room: &Room,
    rooms: &RoomRegistry,
    link: &PeerLink,
) -> Result<Option<SessionEnd>, SessionError> {
    let Some(descriptor) = room.descriptor() else {
        relay::abandon(room, rooms, link.peer());
        return Err(SessionError::Invariant {
            room: room.id(),
            reason: "room is active with an empty seat".to_string(),
        });
    };
    let start = Envelope::Start(descriptor);

    if let Some(opponent) = room.opponent_of(link.peer()) {
        if let Err(err) = opponent.send(&start).await {
            debug!(peer = %opponent.peer(), error = %err, "could not deliver start");
        }
    }
    let delivered = link.send(&start).await.is_ok();
    room.mark_started();

    if !delivered {
        relay::abandon(room, rooms, link.peer());
        return Ok(Some(SessionEnd::Disconnected));
    }
    Ok(None)
}

/// Tell a seated peer why its room closed before the game started.
async fn closed_before_start(room: &Room, link: &PeerLink) -> SessionEnd {
    let notice = room.end_notice().unwrap_or(EndNotice::RoomTimeout);
    if let Err(err) = link.send(&Envelope::End(notice)).await {
        debug!(peer = %link.peer(), error = %err, "could not deliver end notice");
    }
    match notice {
        EndNotice::RoomTimeout => {
            info!(peer = %link.peer(), room = %room.id(), "room did not fill in time");
            SessionEnd::TimedOut
        }
        notice => {
            info!(
                peer = %link.peer(),
                room = %room.id(),
                ?notice,
                "room closed before the game started"
            );
            SessionEnd::Ended(notice)
        }
    }
}
