//! Application services
//!
//! Services depend on port traits, never on concrete adapters.

pub mod game_service;

pub use game_service::{GameService, SendOutcome};
