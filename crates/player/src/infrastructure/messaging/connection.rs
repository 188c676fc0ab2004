//! Connection lifecycle observation.
//!
//! This module provides the read side of the connection state: observers can
//! query the current state or await a transition without holding a reference
//! to the channel manager itself.

use tokio::sync::watch;

use crate::ports::outbound::ConnectionState;

/// Observable connection state for UI binding.
///
/// Multiple observers can share the same underlying state; each tracks which
/// transitions it has already seen.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    rx: watch::Receiver<ConnectionState>,
}

impl ConnectionStateObserver {
    pub fn new(rx: watch::Receiver<ConnectionState>) -> Self {
        Self { rx }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.rx.borrow()
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Wait for the next transition and return the new state.
    ///
    /// Returns `None` once the channel manager has been dropped.
    pub async fn changed(&mut self) -> Option<ConnectionState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Wait until the state equals `target` (returns immediately if it already does).
    pub async fn wait_for(&mut self, target: ConnectionState) -> Option<ConnectionState> {
        self.rx
            .wait_for(|state| *state == target)
            .await
            .ok()
            .map(|state| *state)
    }
}

/// Publish a new connection state, notifying observers only on an actual change.
///
/// Returns whether the state changed.
pub fn set_connection_state(tx: &watch::Sender<ConnectionState>, new_state: ConnectionState) -> bool {
    let mut previous = new_state;
    let changed = tx.send_if_modified(|state| {
        if *state == new_state {
            return false;
        }
        previous = std::mem::replace(state, new_state);
        true
    });
    if changed {
        tracing::debug!(from = %previous, to = %new_state, "Connection state changed");
    }
    changed
}
