//! Platform-agnostic core logic for the game WebSocket client.
//!
//! This is deliberately free of any runtime dependencies. The channel manager
//! owns the actual socket and calls into this core for reconnection backoff
//! math, close classification and the rejoin hook.

use std::time::Duration;

use checkers_domain::Session;
use checkers_shared::ClientCommand;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use super::shared::{BACKOFF_MULTIPLIER, INITIAL_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS};

/// How reconnect attempts are spaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    /// Applied to the delay after every attempt; 1.0 keeps it fixed.
    pub multiplier: f64,
    pub max_delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(MAX_RETRY_DELAY_MS),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Same delay before every attempt, unlimited attempts.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay.max(Duration::from_millis(MAX_RETRY_DELAY_MS)),
            max_attempts: None,
        }
    }
}

/// Backoff state shared by reconnect logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackoffState {
    attempts: u32,
    delay: Option<Duration>,
}

impl BackoffState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self, policy: &ReconnectPolicy) -> bool {
        policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
    }

    /// Advance to the next attempt, updating the delay for the subsequent attempt.
    ///
    /// Returns the delay to wait *before* performing this attempt, or `None`
    /// once the policy's attempt limit is reached.
    pub fn next_delay_and_advance(&mut self, policy: &ReconnectPolicy) -> Option<Duration> {
        if self.is_exhausted(policy) {
            return None;
        }

        let current = self
            .delay
            .unwrap_or(policy.initial_delay)
            .min(policy.max_delay);
        self.attempts += 1;
        let next_ms = (current.as_millis() as f64) * policy.multiplier.max(1.0);
        let capped = next_ms.min(policy.max_delay.as_millis() as f64) as u64;
        self.delay = Some(Duration::from_millis(capped));
        Some(current)
    }
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// Normal close handshake
    Clean,
    /// Dropped, errored, failed to open, or closed with a non-normal code
    Abnormal,
}

impl CloseKind {
    /// Classify a server Close frame by its code. A frame without a code is abnormal.
    pub fn from_code(code: Option<CloseCode>) -> Self {
        match code {
            Some(CloseCode::Normal) => Self::Clean,
            _ => Self::Abnormal,
        }
    }
}

/// A reconnect is due only for an abnormal close the client did not ask for.
pub fn should_reconnect(close: CloseKind, intentional: bool) -> bool {
    !intentional && close == CloseKind::Abnormal
}

/// The command to send first on a fresh connection, if the session is mid-game.
pub fn rejoin_command(session: &Session) -> Option<ClientCommand> {
    let game_id = session.rejoin_target()?;
    match ClientCommand::rejoin(game_id) {
        Ok(command) => Some(command),
        Err(e) => {
            tracing::warn!(game_id, error = %e, "Stored game id cannot be rejoined");
            None
        }
    }
}
