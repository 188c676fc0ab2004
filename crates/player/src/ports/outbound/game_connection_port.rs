//! Game Connection Port - Outbound port for the server connection
//!
//! This port abstracts the duplex text channel to the checkers server so the
//! application layer can submit commands without depending on the concrete
//! WebSocket client.

use std::fmt;

/// Connection state for the game session.
///
/// Owned by the channel manager; everything else only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the server
    #[default]
    Disconnected,
    /// Attempting to establish connection
    Connecting,
    /// Successfully connected
    Connected,
    /// The transport reported an error; the following close drives recovery
    Errored,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// Port for handing raw command frames to the server.
///
/// NOTE: `send_text` is fire-and-forget and must never block. It returns
/// `true` only when the frame was handed to an open connection; nothing is
/// queued for later delivery.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait GameConnectionPort: Send + Sync {
    /// Get the current connection state
    fn state(&self) -> ConnectionState;

    /// Hand one text frame to the connection
    fn send_text(&self, text: &str) -> bool;
}
