//! Board coordinates
//!
//! The Janggi board is 10 rows (0..=9) by 9 columns (0..=8). Every client
//! renders its own seat at the bottom, so a move made by one seat is shown to
//! the other seat rotated by 180°: `(r, c)` becomes `(9 - r, 8 - c)`.

use crate::errors::BoardError;
use serde::{Deserialize, Serialize};

/// Number of rows on the board
pub const ROWS: u8 = 10;
/// Number of columns on the board
pub const COLS: u8 = 9;

/// A point on the board, serialized as `[row, col]`
///
/// Construction checks bounds, so every `Coord` is on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[i64; 2]", into = "[u8; 2]")]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    pub fn new(row: i64, col: i64) -> Result<Self, BoardError> {
        if (0..ROWS as i64).contains(&row) && (0..COLS as i64).contains(&col) {
            Ok(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(BoardError::OutOfBounds { row, col })
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// The same point as seen from the opposite seat.
    pub fn rotated(self) -> Self {
        Self {
            row: ROWS - 1 - self.row,
            col: COLS - 1 - self.col,
        }
    }
}

impl TryFrom<[i64; 2]> for Coord {
    type Error = BoardError;

    fn try_from([row, col]: [i64; 2]) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl From<Coord> for [u8; 2] {
    fn from(coord: Coord) -> Self {
        [coord.row, coord.col]
    }
}
