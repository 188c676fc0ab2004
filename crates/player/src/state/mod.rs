//! Client-side state: the session store, its message log and click selection.
//!
//! All of it is owned by one task; nothing here locks.

pub mod message_log;
pub mod selection;
pub mod session_store;

pub use message_log::{LogEntry, LogKind, MessageLog, DEFAULT_LOG_CAPACITY};
pub use selection::{MoveIntent, Selection, SelectionController};
pub use session_store::{GameState, SessionStore};
