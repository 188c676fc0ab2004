//! Game service: the façade the UI drives
//!
//! This service owns the session store and selection controller and submits
//! commands through the game connection port. It depends on the trait
//! abstraction, not the concrete WebSocket implementation, so it runs the same
//! against a mock in tests.
//!
//! Outbound commands are never queued: when the port reports it is not
//! connected the failure is logged for the player and the command is dropped.

use std::sync::Arc;

use checkers_domain::{Session, Square};
use checkers_shared::{ClientCommand, CommandError};
use tokio::sync::watch;

use crate::infrastructure::message_translator::parse_with;
use crate::ports::outbound::{GameConnectionPort, PlayerEvent};
use crate::state::{GameState, LogKind, MessageLog, Selection, SelectionController, SessionStore};

/// What happened to an outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NotConnected,
    Invalid(CommandError),
}

pub struct GameService {
    port: Arc<dyn GameConnectionPort>,
    store: SessionStore,
    selection: SelectionController,
}

impl GameService {
    pub fn new(port: Arc<dyn GameConnectionPort>, log_capacity: usize) -> Self {
        Self::with_store(port, SessionStore::new(log_capacity))
    }

    /// Use an existing store, e.g. one whose session feed is already wired to the connection.
    pub fn with_store(port: Arc<dyn GameConnectionPort>, store: SessionStore) -> Self {
        Self {
            port,
            store,
            selection: SelectionController::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn log(&self) -> &MessageLog {
        self.store.log()
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    /// Session feed for the channel manager's rejoin hook.
    pub fn session_watch(&self) -> watch::Receiver<Session> {
        self.store.session_watch()
    }

    /// Interpret and apply one inbound frame.
    pub fn handle_frame(&mut self, raw: &str) {
        let ctx = self.store.protocol_context();
        let Some(event) = parse_with(raw, &ctx) else {
            return;
        };
        tracing::debug!(?event, "Applying server event");
        self.apply(event);
    }

    fn apply(&mut self, event: PlayerEvent) {
        self.store.apply(event);
        self.selection.sync(self.store.state());
    }

    /// Record a client-side notice in the log.
    pub fn notice(&mut self, kind: LogKind, text: impl Into<String>) {
        self.store.notice(kind, text);
    }

    pub fn login(&mut self, username: &str, password: &str) -> SendOutcome {
        self.submit(ClientCommand::login(username, password))
    }

    pub fn register(&mut self, email: &str, username: &str, password: &str) -> SendOutcome {
        self.submit(ClientCommand::register(email, username, password))
    }

    pub fn create_game(&mut self) -> SendOutcome {
        self.send(&ClientCommand::Create)
    }

    pub fn join_game(&mut self, game_id: &str) -> SendOutcome {
        self.submit(ClientCommand::join(game_id))
    }

    /// Leave the current game. The local session is cleared even if the
    /// server could not be told.
    pub fn leave_game(&mut self) -> SendOutcome {
        let outcome = self.send(&ClientCommand::Leave);
        self.apply(PlayerEvent::SessionLeft);
        outcome
    }

    pub fn request_state(&mut self) -> SendOutcome {
        self.send(&ClientCommand::State)
    }

    pub fn request_help(&mut self) -> SendOutcome {
        self.send(&ClientCommand::Help)
    }

    /// Feed a board click to the selection controller.
    ///
    /// Returns the send outcome when the click completed a move, `None` otherwise.
    pub fn click(&mut self, x: i64, y: i64) -> Option<SendOutcome> {
        let square = match Square::new(x, y) {
            Ok(square) => square,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring click");
                return None;
            }
        };
        let intent = self.selection.click(square, self.store.state())?;
        Some(self.send(&intent.command()))
    }

    fn submit(&mut self, command: Result<ClientCommand, CommandError>) -> SendOutcome {
        match command {
            Ok(command) => self.send(&command),
            Err(e) => {
                self.store
                    .notice(LogKind::Rejection, format!("Invalid command: {e}"));
                SendOutcome::Invalid(e)
            }
        }
    }

    fn send(&mut self, command: &ClientCommand) -> SendOutcome {
        if self.port.send_text(&command.to_string()) {
            tracing::debug!(command = command.name(), "Command sent");
            SendOutcome::Sent
        } else {
            tracing::warn!(command = command.name(), state = %self.port.state(), "Not connected; command dropped");
            self.store.notice(
                LogKind::Error,
                format!("Not connected: `{}` was not sent", command.name()),
            );
            SendOutcome::NotConnected
        }
    }
}
