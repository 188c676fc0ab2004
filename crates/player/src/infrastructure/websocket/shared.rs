//! Shared constants for the WebSocket client.
//!
//! This module is intentionally runtime-agnostic so the pure reconnect math in
//! `core` and the configuration layer agree on defaults.

// Reconnection constants
pub const INITIAL_RETRY_DELAY_MS: u64 = 3_000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
/// 1.0 keeps the delay fixed between attempts.
pub const BACKOFF_MULTIPLIER: f64 = 1.0;

/// How long `close()` waits for the server to acknowledge a Close frame.
pub const CLOSE_GRACE_MS: u64 = 1_000;
