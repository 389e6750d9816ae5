//! Game relay
//!
//! One relay loop runs per seated peer once its room is Active. It reads that
//! peer's frames, rotates each move into the opposing seat's orientation and
//! queues it on the opponent's link. The next frame is not read until the
//! forward has been queued, which keeps each sender's moves in order.
//!
//! A loop never writes "end" to the other seat. Whoever closes the room only
//! flips its status; each loop notices the room closing and sends "end" to
//! its own peer, so the notice always lands ahead of that peer's close.

use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};
use types::envelope::{decode_move, EndNotice, Envelope};
use types::ids::PeerId;

use crate::error::SessionError;
use crate::events::Outcome;
use crate::link::PeerLink;
use crate::registry::RoomRegistry;
use crate::room::Room;
use crate::session::SessionEnd;

/// Relay `me`'s moves until the room closes or the connection drops.
pub async fn run<S>(
    room: &Room,
    rooms: &RoomRegistry,
    me: &PeerLink,
    inbound: &mut S,
) -> Result<SessionEnd, SessionError>
where
    S: Stream<Item = String> + Unpin,
{
    loop {
        let text = tokio::select! {
            biased;
            _ = room.closed() => return Ok(ended(room, me).await),
            frame = inbound.next() => match frame {
                Some(text) => text,
                None => {
                    abandon(room, rooms, me.peer());
                    return Ok(SessionEnd::Disconnected);
                }
            },
        };

        let event = match decode_move(&text) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    peer = %me.peer(),
                    room = %room.id(),
                    error = %err,
                    "dropping malformed move frame"
                );
                continue;
            }
        };

        let opponent = room
            .opponent_of(me.peer())
            .ok_or_else(|| SessionError::Invariant {
                room: room.id(),
                reason: format!("{} sent a move without an opposing seat", me.peer()),
            })?;

        let forwarded = Envelope::Move(event.for_opponent(Utc::now()));
        tokio::select! {
            biased;
            _ = room.closed() => return Ok(ended(room, me).await),
            sent = opponent.send(&forwarded) => {
                if let Err(err) = sent {
                    debug!(
                        peer = %opponent.peer(),
                        error = %err,
                        "opponent gone, move not delivered"
                    );
                }
            }
        }

        if event.over {
            rooms.finish(
                &room.id(),
                Outcome::Finished {
                    reported_by: me.peer().clone(),
                    turn: event.turn,
                },
            );
            return Ok(ended(room, me).await);
        }
    }
}

/// Close the room because `peer`'s connection is gone.
///
/// Returns false if the room had already closed for another reason.
pub fn abandon(room: &Room, rooms: &RoomRegistry, peer: &PeerId) -> bool {
    let closed = rooms.finish(&room.id(), Outcome::Abandoned { by: peer.clone() });
    if closed {
        info!(%peer, room = %room.id(), "peer left mid-game");
    }
    closed
}

async fn ended(room: &Room, me: &PeerLink) -> SessionEnd {
    let notice = room.end_notice().unwrap_or(EndNotice::GameOver);
    if let Err(err) = me.send(&Envelope::End(notice)).await {
        debug!(peer = %me.peer(), error = %err, "could not deliver end notice");
    }
    SessionEnd::Ended(notice)
}
