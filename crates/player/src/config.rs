//! Player configuration loaded from environment variables
//!
//! # Environment Variables
//!
//! - `CHECKERS_WS_URL` - Server WebSocket URL (default: `ws://localhost:3000`)
//! - `CHECKERS_RECONNECT_DELAY_MS` - Delay before the first reconnect attempt (default: 3000)
//! - `CHECKERS_RECONNECT_MULTIPLIER` - Delay growth per attempt, 1.0 = fixed (default: 1.0)
//! - `CHECKERS_RECONNECT_MAX_DELAY_MS` - Upper bound on the delay (default: 30000)
//! - `CHECKERS_RECONNECT_MAX_ATTEMPTS` - Give up after this many attempts (default: unlimited)
//! - `CHECKERS_LOG_CAPACITY` - Message log entries kept (default: 500)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::infrastructure::websocket::ReconnectPolicy;
use crate::state::DEFAULT_LOG_CAPACITY;

pub const DEFAULT_WS_URL: &str = "ws://localhost:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: invalid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{key}: unsupported scheme `{scheme}` (expected ws or wss)")]
    UnsupportedScheme { key: &'static str, scheme: String },

    #[error("{key}: cannot parse `{value}`")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    OutOfRange { key: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub ws_url: Url,
    pub reconnect: ReconnectPolicy,
    pub log_capacity: usize,
}

impl PlayerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable; unset variables take their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ReconnectPolicy::default();

        let ws_url = parse_ws_url(
            "CHECKERS_WS_URL",
            lookup("CHECKERS_WS_URL").as_deref().unwrap_or(DEFAULT_WS_URL),
        )?;

        let initial_ms: u64 = parse_or(
            &lookup,
            "CHECKERS_RECONNECT_DELAY_MS",
            defaults.initial_delay.as_millis() as u64,
        )?;
        let multiplier: f64 =
            parse_or(&lookup, "CHECKERS_RECONNECT_MULTIPLIER", defaults.multiplier)?;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::OutOfRange {
                key: "CHECKERS_RECONNECT_MULTIPLIER",
                reason: "must be a finite number of at least 1.0",
            });
        }
        let max_ms: u64 = parse_or(
            &lookup,
            "CHECKERS_RECONNECT_MAX_DELAY_MS",
            defaults.max_delay.as_millis() as u64,
        )?;
        if max_ms < initial_ms {
            return Err(ConfigError::OutOfRange {
                key: "CHECKERS_RECONNECT_MAX_DELAY_MS",
                reason: "must not be less than CHECKERS_RECONNECT_DELAY_MS",
            });
        }
        let max_attempts = lookup("CHECKERS_RECONNECT_MAX_ATTEMPTS")
            .map(|value| parse_value("CHECKERS_RECONNECT_MAX_ATTEMPTS", &value))
            .transpose()?;

        let log_capacity: usize =
            parse_or(&lookup, "CHECKERS_LOG_CAPACITY", DEFAULT_LOG_CAPACITY)?;
        if log_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                key: "CHECKERS_LOG_CAPACITY",
                reason: "must be at least 1",
            });
        }

        Ok(Self {
            ws_url,
            reconnect: ReconnectPolicy {
                initial_delay: Duration::from_millis(initial_ms),
                multiplier,
                max_delay: Duration::from_millis(max_ms),
                max_attempts,
            },
            log_capacity,
        })
    }
}

fn parse_ws_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            key,
            scheme: other.to_string(),
        }),
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Helper to read a variable with default fallback; a set but unparseable value is an error.
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

/// Load `.env.local` then `.env` from the working directory, if present.
///
/// Variables already set in the environment win.
pub fn load_dotenv() {
    for filename in [".env.local", ".env"] {
        let path = std::path::Path::new(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
