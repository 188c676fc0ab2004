//! Outbound command protocol (Player → Server)
//!
//! The server speaks a line-oriented text protocol: one command per frame,
//! whitespace-separated arguments. Arguments are validated on construction
//! because an embedded space would shift every following argument.

use std::fmt;

use checkers_domain::Square;
use thiserror::Error;

/// Errors building a command from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} cannot contain whitespace")]
    Whitespace { field: &'static str },
}

/// A single outbound command frame.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Login { username: String, password: String },
    Register {
        email: String,
        username: String,
        password: String,
    },
    Create,
    Join { game_id: String },
    /// Re-announce an existing game after a reconnect.
    ///
    /// Assumes the server understands `rejoin`; servers that only dispatch
    /// `join` answer it with an unknown-command error, which is logged.
    Rejoin { game_id: String },
    Move { from: Square, to: Square },
    Leave,
    /// Ask the server for a fresh state snapshot.
    State,
    Help,
}

fn token(field: &'static str, value: &str) -> Result<String, CommandError> {
    if value.is_empty() {
        return Err(CommandError::Empty { field });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(CommandError::Whitespace { field });
    }
    Ok(value.to_string())
}

impl ClientCommand {
    pub fn login(username: &str, password: &str) -> Result<Self, CommandError> {
        Ok(Self::Login {
            username: token("username", username)?,
            password: token("password", password)?,
        })
    }

    pub fn register(email: &str, username: &str, password: &str) -> Result<Self, CommandError> {
        Ok(Self::Register {
            email: token("email", email)?,
            username: token("username", username)?,
            password: token("password", password)?,
        })
    }

    pub fn join(game_id: &str) -> Result<Self, CommandError> {
        Ok(Self::Join {
            game_id: token("game id", game_id)?,
        })
    }

    pub fn rejoin(game_id: &str) -> Result<Self, CommandError> {
        Ok(Self::Rejoin {
            game_id: token("game id", game_id)?,
        })
    }

    pub fn move_piece(from: Square, to: Square) -> Self {
        Self::Move { from, to }
    }

    /// Command keyword, safe to log (never includes credentials).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Rejoin { .. } => "rejoin",
            Self::Move { .. } => "move",
            Self::Leave => "leave",
            Self::State => "state",
            Self::Help => "help",
        }
    }
}

/// Renders the exact wire line.
impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { username, password } => write!(f, "login {username} {password}"),
            Self::Register {
                email,
                username,
                password,
            } => write!(f, "register {email} {username} {password}"),
            Self::Create => write!(f, "create"),
            Self::Join { game_id } => write!(f, "join {game_id}"),
            Self::Rejoin { game_id } => write!(f, "rejoin {game_id}"),
            Self::Move { from, to } => {
                write!(f, "move {} {} {} {}", from.x(), from.y(), to.x(), to.y())
            }
            Self::Leave => write!(f, "leave"),
            Self::State => write!(f, "state"),
            Self::Help => write!(f, "help"),
        }
    }
}

/// Redacts passwords so commands can be traced safely.
impl fmt::Debug for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Register {
                email, username, ..
            } => f
                .debug_struct("Register")
                .field("email", email)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Join { game_id } => f.debug_struct("Join").field("game_id", game_id).finish(),
            Self::Rejoin { game_id } => {
                f.debug_struct("Rejoin").field("game_id", game_id).finish()
            }
            Self::Move { from, to } => f
                .debug_struct("Move")
                .field("from", from)
                .field("to", to)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}
