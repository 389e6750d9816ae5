//! Identifier types for matchmaking entities
//!
//! Peer identities are assigned upstream (by whatever authenticates the
//! client) and arrive as opaque strings. Room identifiers are minted here with
//! UUID v7 so rooms sort by the time they were matched.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a connected peer
///
/// Unique per client and externally assigned; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerId(String);

impl PeerId {
    /// Try to create a PeerId, returning None for a blank identity
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Get the identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PeerId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value).ok_or_else(|| "peer id must not be blank".to_string())
    }
}

impl From<PeerId> for String {
    fn from(id: PeerId) -> Self {
        id.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a room
///
/// Generated at match time. Uses UUID v7 for time-based sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(Uuid);

impl RoomId {
    /// Create a new RoomId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_rejects_blank() {
        assert!(PeerId::try_new("u1").is_some());
        assert!(PeerId::try_new("").is_none());
        assert!(PeerId::try_new("   ").is_none());
    }

    #[test]
    fn test_peer_id_serialization() {
        let id = PeerId::try_new("u1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u1\"");

        let deserialized: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_peer_id_blank_fails_to_deserialize() {
        assert!(serde_json::from_str::<PeerId>("\"\"").is_err());
    }

    #[test]
    fn test_room_id_creation() {
        let id1 = RoomId::new();
        let id2 = RoomId::new();
        assert_ne!(id1, id2, "RoomIds should be unique");
    }

    #[test]
    fn test_room_id_serialization() {
        let id = RoomId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
