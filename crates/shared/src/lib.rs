//! Checkers Player Shared - wire protocol types
//!
//! This crate contains the types exchanged with the checkers server:
//! - Outbound line commands (`ClientCommand`)
//! - Inbound structured messages (`ServerMessage`) in every shape the server
//!   has been observed to send
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Permissive decoding** - historical field names are aliases, not branches

pub mod commands;
pub mod messages;

pub use commands::{ClientCommand, CommandError};
pub use messages::{
    ErrorMessage, GameCreated, GameInfo, GameSnapshot, LoginSuccess, MoveResult,
    RegisterSuccess, ServerMessage, WireBoard, WireId, WirePiece, WireSquare,
};
