//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with the server connection without
//! depending on concrete implementations.

pub mod game_connection_port;
pub mod player_events;

pub use game_connection_port::{ConnectionState, GameConnectionPort};
pub use player_events::PlayerEvent;

#[cfg(any(test, feature = "testing"))]
pub use game_connection_port::MockGameConnectionPort;
