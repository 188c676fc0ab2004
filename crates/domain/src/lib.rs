//! Checkers Player Domain
//!
//! Value types shared by the wire protocol and the client: squares, pieces,
//! the 8x8 board, seats, turn state and the local session. Every type enforces
//! its own invariants on construction; nothing here knows the rules of checkers.

pub mod board;
pub mod error;
pub mod session;

pub use board::{Board, Piece, PieceColor, Square, BOARD_SIZE};
pub use error::DomainError;
pub use session::{GameStatus, Players, Seat, Session, TurnState};
