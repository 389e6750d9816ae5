//! Error types for the wire format
//!
//! Error taxonomy for frame encoding/decoding using thiserror

use thiserror::Error;

/// Frame codec errors
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// A payload could not be represented as JSON
    #[error("Encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// An inbound frame body was malformed
    #[error("Decoding error: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Board geometry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Coordinate ({row}, {col}) is off the 10x9 board")]
    OutOfBounds { row: i64, col: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_display() {
        let err = BoardError::OutOfBounds { row: 10, col: -1 };
        assert_eq!(err.to_string(), "Coordinate (10, -1) is off the 10x9 board");
    }

    #[test]
    fn test_decoding_error_display() {
        let source = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = EnvelopeError::Decoding(source);
        assert!(err.to_string().starts_with("Decoding error:"));
    }
}
