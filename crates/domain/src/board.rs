//! Board value types
//!
//! The board is always exactly 8x8 and indexed `[y][x]`. Cells are never
//! computed locally: a [`Board`] is built from an authoritative snapshot and
//! replaced wholesale when the next one arrives.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// Piece color. Player 1 plays `Light`, player 2 plays `Dark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceColor {
    Light,
    Dark,
}

impl PieceColor {
    /// Single-letter marker used by the server's text snapshots.
    pub fn marker(self) -> char {
        match self {
            Self::Light => 'W',
            Self::Dark => 'B',
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// An occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub color: PieceColor,
    pub is_king: bool,
}

impl Piece {
    pub const fn man(color: PieceColor) -> Self {
        Self {
            color,
            is_king: false,
        }
    }

    pub const fn king(color: PieceColor) -> Self {
        Self {
            color,
            is_king: true,
        }
    }
}

/// A zero-based board coordinate, guaranteed to lie within `0..8` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Square {
    x: u8,
    y: u8,
}

impl Square {
    /// Build a square, rejecting anything off the board.
    pub fn new(x: i64, y: i64) -> Result<Self, DomainError> {
        let size = BOARD_SIZE as i64;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(DomainError::out_of_bounds(x, y))
        }
    }

    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    pub fn y(self) -> usize {
        usize::from(self.y)
    }
}

impl TryFrom<(i64, i64)> for Square {
    type Error = DomainError;

    fn try_from((x, y): (i64, i64)) -> Result<Self, Self::Error> {
        Self::new(x, y)
    }
}

impl From<Square> for (i64, i64) {
    fn from(square: Square) -> Self {
        (i64::from(square.x), i64::from(square.y))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An authoritative 8x8 board snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from row-major cells, failing unless the input is exactly 8x8.
    pub fn from_rows(rows: Vec<Vec<Option<Piece>>>) -> Result<Self, DomainError> {
        if rows.len() != BOARD_SIZE {
            let cols = rows.first().map_or(0, Vec::len);
            return Err(DomainError::InvalidBoardShape {
                rows: rows.len(),
                cols,
            });
        }

        let mut cells = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != BOARD_SIZE {
                return Err(DomainError::InvalidBoardShape {
                    rows: BOARD_SIZE,
                    cols: row.len(),
                });
            }
            for (x, cell) in row.into_iter().enumerate() {
                cells[y][x] = cell;
            }
        }

        Ok(Self { cells })
    }

    /// Return a copy with `piece` placed on `square`.
    pub fn with_piece(mut self, square: Square, piece: Piece) -> Self {
        self.cells[square.y()][square.x()] = Some(piece);
        self
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.y()][square.x()]
    }

    pub fn count(&self, color: PieceColor) -> usize {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .filter(|piece| piece.color == color)
            .count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2 3 4 5 6 7")?;
        for (y, row) in self.cells.iter().enumerate() {
            write!(f, "{y} ")?;
            for (x, cell) in row.iter().enumerate() {
                match cell {
                    Some(piece) => {
                        let king = if piece.is_king { 'K' } else { ' ' };
                        write!(f, "{}{}", piece.color.marker(), king)?;
                    }
                    None if (x + y) % 2 == 1 => write!(f, ". ")?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
