//! WebSocket client for the game server connection
//!
//! - `client`: tokio-tungstenite based channel manager
//! - `core`: runtime-free reconnect policy and close classification
//! - `timer`: the single-slot reconnect timer

mod client;
mod core;
mod shared;
mod timer;

pub use client::{ChannelManager, ConnectionGuard};
pub use self::core::{CloseKind, ReconnectPolicy};
pub use shared::{BACKOFF_MULTIPLIER, INITIAL_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS};
pub use timer::ReconnectTimer;
