//! Outbound side of a peer connection
//!
//! Only the connection's writer task touches the socket sink. Everyone else
//! (the peer's own session, the dispatcher, the opposing seat's relay) writes
//! through a [`PeerLink`], which queues frames on a bounded channel that the
//! writer drains in order.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use types::envelope::Envelope;
use types::ids::PeerId;

use crate::error::SessionError;

/// A frame queued for a connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    /// Flush what is queued, then close the socket
    Close,
}

/// Write handle for one peer's connection
#[derive(Debug, Clone)]
pub struct PeerLink {
    peer: PeerId,
    tx: mpsc::Sender<Outbound>,
}

impl PeerLink {
    pub fn new(peer: PeerId, tx: mpsc::Sender<Outbound>) -> Self {
        Self { peer, tx }
    }

    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    /// Whether the writer has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queue an envelope, waiting for room in the peer's queue.
    pub async fn send(&self, envelope: &Envelope) -> Result<(), SessionError> {
        let text = envelope.encode()?;
        self.tx
            .send(Outbound::Text(text))
            .await
            .map_err(|_| self.disconnected())
    }

    /// Queue an envelope without waiting.
    ///
    /// A full queue spills the frame to a detached task so the caller never
    /// stalls on a slow peer.
    pub fn deliver_detached(&self, envelope: &Envelope) -> Result<(), SessionError> {
        let text = envelope.encode()?;
        match self.tx.try_send(Outbound::Text(text)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(frame)) => {
                let tx = self.tx.clone();
                let peer = self.peer.clone();
                tokio::spawn(async move {
                    if tx.send(frame).await.is_err() {
                        debug!(%peer, "peer left before a queued frame was delivered");
                    }
                });
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(self.disconnected()),
        }
    }

    fn disconnected(&self) -> SessionError {
        SessionError::Connection {
            peer: self.peer.clone(),
        }
    }
}
