//! The `{action, msg}` frame format
//!
//! Every frame the server writes to a peer is exactly one [`Envelope`]. The
//! payload type is fixed by the action, so the enum carries it directly.
//!
//! Inbound frames are not enveloped: the join request and move events are
//! decoded from the raw frame body, and the ready acknowledgment is the
//! literal text `done`.

use crate::errors::EnvelopeError;
use crate::game::MoveEvent;
use crate::peer::{JoinRequest, PeerView};
use crate::room::RoomDescriptor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Literal token a client sends once it has processed "matched"
pub const READY_ACK: &str = "done";

/// Why a game ended, sent as the literal payload of "end"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndNotice {
    #[serde(rename = "Game Over")]
    GameOver,
    #[serde(rename = "Opponent Left")]
    OpponentLeft,
    #[serde(rename = "Room Timeout")]
    RoomTimeout,
}

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "msg", rename_all = "lowercase")]
pub enum Envelope {
    Matched(PeerView),
    Start(RoomDescriptor),
    Move(MoveEvent),
    End(EndNotice),
}

impl Envelope {
    /// Serialize to the JSON text written to the socket
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(EnvelopeError::Encoding)
    }
}

/// Decode an inbound frame body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EnvelopeError> {
    serde_json::from_slice(bytes).map_err(EnvelopeError::Decoding)
}

/// Decode the join request a client sends first
pub fn decode_join(text: &str) -> Result<JoinRequest, EnvelopeError> {
    decode(text.as_bytes())
}

/// Decode a move frame
pub fn decode_move(text: &str) -> Result<MoveEvent, EnvelopeError> {
    decode(text.as_bytes())
}

/// Whether a frame is the ready acknowledgment.
///
/// Accepts the bare token as well as the token as a JSON string.
pub fn is_ready_ack(text: &str) -> bool {
    let text = text.trim();
    text == READY_ACK || text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) == Some(READY_ACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::ids::{PeerId, RoomId};
    use crate::peer::{SeatView, Side};
    use crate::room::RoomStatus;
    use serde_json::Value;

    fn seat(id: &str, side: Side) -> SeatView {
        SeatView {
            id: PeerId::try_new(id).unwrap(),
            rating: 1200,
            side,
            formation: None,
        }
    }

    #[test]
    fn test_matched_frame_shape() {
        let room = RoomId::new();
        let frame = Envelope::Matched(PeerView::new(&seat("u1", Side::First), room))
            .encode()
            .unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(value["action"], "matched");
        assert_eq!(value["msg"]["id"], "u1");
        assert_eq!(value["msg"]["side"], 8);
    }

    #[test]
    fn test_start_frame_shape() {
        let descriptor = RoomDescriptor {
            id: RoomId::new(),
            status: RoomStatus::Active,
            seats: vec![seat("u1", Side::First), seat("u2", Side::Second)],
        };
        let value: Value =
            serde_json::from_str(&Envelope::Start(descriptor).encode().unwrap()).unwrap();

        assert_eq!(value["action"], "start");
        assert_eq!(value["msg"]["status"], 1);
        assert_eq!(value["msg"]["seats"][1]["id"], "u2");
    }

    #[test]
    fn test_move_frame_shape() {
        let event = MoveEvent {
            movement: crate::game::Move {
                current: Coord::new(0, 8).unwrap(),
                previous: Coord::new(1, 8).unwrap(),
            },
            turn: 4,
            ..MoveEvent::default()
        };
        let value: Value =
            serde_json::from_str(&Envelope::Move(event).encode().unwrap()).unwrap();

        assert_eq!(value["action"], "move");
        assert_eq!(value["msg"]["move"]["current"], serde_json::json!([0, 8]));
        assert_eq!(value["msg"]["move"]["previous"], serde_json::json!([1, 8]));
        assert_eq!(value["msg"]["turn"], 4);
        assert_eq!(value["msg"]["over"], false);
    }

    #[test]
    fn test_end_frame_is_literal() {
        let frame = Envelope::End(EndNotice::GameOver).encode().unwrap();
        assert_eq!(frame, r#"{"action":"end","msg":"Game Over"}"#);
    }

    #[test]
    fn test_decode_envelope_back() {
        let frame = r#"{"action":"end","msg":"Room Timeout"}"#;
        let envelope: Envelope = decode(frame.as_bytes()).unwrap();
        assert_eq!(envelope, Envelope::End(EndNotice::RoomTimeout));
    }

    #[test]
    fn test_decode_move_rejects_garbage() {
        assert!(matches!(
            decode_move("not json"),
            Err(EnvelopeError::Decoding(_))
        ));
        assert!(decode_move(r#"{"move":{"current":[10,0]}}"#).is_err());
    }

    #[test]
    fn test_decode_join() {
        let req = decode_join(r#"{"id":"u2","rating":1350}"#).unwrap();
        assert_eq!(req.id.as_str(), "u2");
        assert_eq!(req.rating, 1350);
        assert!(decode_join("done").is_err());
    }

    #[test]
    fn test_ready_ack() {
        assert!(is_ready_ack("done"));
        assert!(is_ready_ack("\"done\""));
        assert!(is_ready_ack(" done\n"));
        assert!(!is_ready_ack("Done"));
        assert!(!is_ready_ack(r#"{"over":true}"#));
    }
}
