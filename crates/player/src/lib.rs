//! Checkers player client.
//!
//! Keeps a player's view of a two-player checkers game in sync with the
//! authoritative server over one WebSocket connection:
//!
//! - `infrastructure::websocket`: connection, reconnect and rejoin-on-open
//! - `infrastructure::message_translator`: raw frames to `PlayerEvent`s
//! - `state`: the session store and the turn-gated selection controller
//! - `application`: the `GameService` façade the terminal runner drives

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod runner;
pub mod state;

pub use application::services::{GameService, SendOutcome};
pub use config::{ConfigError, PlayerConfig};
pub use infrastructure::websocket::{ChannelManager, ConnectionGuard, ReconnectPolicy};
