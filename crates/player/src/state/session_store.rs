//! Session store: the single writer of the local game view.
//!
//! Every change to session, seating, board and turn goes through
//! [`SessionStore::apply`]. Snapshot events are idempotent: an identical
//! redelivery of the last applied snapshot is skipped, log included.

use checkers_domain::{Board, GameStatus, PieceColor, Players, Seat, Session, Square, TurnState};
use tokio::sync::watch;

use crate::infrastructure::message_translator::ProtocolContext;
use crate::ports::outbound::PlayerEvent;

use super::message_log::{LogKind, MessageLog};

/// Everything the client believes about its game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub session: Session,
    pub players: Option<Players>,
    pub board: Option<Board>,
    pub turn: TurnState,
}

impl GameState {
    /// The local player's seat, from the seated ids rather than the board.
    pub fn local_seat(&self) -> Option<Seat> {
        let player_id = self.session.player_id.as_deref()?;
        self.players.as_ref()?.seat_of(player_id)
    }

    pub fn local_color(&self) -> Option<PieceColor> {
        self.local_seat().map(Seat::color)
    }

    /// The turn gate: the game is being played and the local player holds the turn.
    pub fn is_my_turn(&self) -> bool {
        self.turn.status == GameStatus::Playing
            && self.session.player_id.is_some()
            && self.turn.current_player_id == self.session.player_id
    }
}

pub struct SessionStore {
    state: GameState,
    log: MessageLog,
    session_tx: watch::Sender<Session>,
    /// Last snapshot applied; cleared when the game changes
    last_snapshot: Option<PlayerEvent>,
}

impl SessionStore {
    pub fn new(log_capacity: usize) -> Self {
        let (session_tx, _) = watch::channel(Session::default());
        Self {
            state: GameState::default(),
            log: MessageLog::new(log_capacity),
            session_tx,
            last_snapshot: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Receiver that always holds the current session.
    pub fn session_watch(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    pub fn protocol_context(&self) -> ProtocolContext {
        ProtocolContext {
            players: self.state.players.clone(),
        }
    }

    pub fn local_color(&self) -> Option<PieceColor> {
        self.state.local_color()
    }

    /// Append a client-side notice without touching game state.
    pub fn notice(&mut self, kind: LogKind, text: impl Into<String>) {
        self.log.push(kind, text);
    }

    /// Apply one event. The only way game state changes.
    pub fn apply(&mut self, event: PlayerEvent) {
        if event.is_snapshot() && self.last_snapshot.as_ref() == Some(&event) {
            tracing::debug!("Skipping repeated snapshot");
            return;
        }
        let snapshot = event.is_snapshot().then(|| event.clone());

        match event {
            PlayerEvent::LoggedIn { username } => {
                self.log.push(LogKind::Info, format!("Logged in as {username}"));
                self.state.session.player_id = Some(username);
            }

            PlayerEvent::Registered => {
                self.log
                    .push(LogKind::Info, "Registration successful. You can now log in.");
            }

            PlayerEvent::GameCreated {
                game_id,
                invite_code,
            } => {
                let text = match &invite_code {
                    Some(code) => format!("Game created with ID: {game_id} (invite code {code})"),
                    None => format!("Game created with ID: {game_id}"),
                };
                // A late or repeated announcement for the game already in play.
                if !self.enter_game(game_id) {
                    tracing::debug!("Ignoring game_created for the current game");
                    return;
                }
                self.log.push(LogKind::Info, text);
            }

            PlayerEvent::GameJoined {
                game_id,
                players,
                board,
                current_turn,
            } => {
                let new_game = self.enter_game(game_id.clone());
                let seating_changed = new_game || self.state.players.as_ref() != Some(&players);
                let status = if players.player2_id.is_some() {
                    GameStatus::Playing
                } else {
                    GameStatus::Waiting
                };
                self.state.turn.status = self.state.turn.status.advance(status);
                if seating_changed {
                    let opponent = players
                        .player2_id
                        .as_deref()
                        .unwrap_or("(waiting for opponent)");
                    self.log.push(
                        LogKind::Info,
                        format!("Joined game {game_id}: {} vs {opponent}", players.player1_id),
                    );
                }
                self.state.players = Some(players);
                self.replace_snapshot(board, current_turn);
            }

            PlayerEvent::GameUpdated {
                board,
                current_turn,
            } => {
                self.replace_snapshot(board, current_turn);
            }

            PlayerEvent::MoveApplied {
                from,
                to,
                success: true,
                board,
                current_turn,
            } => {
                self.log
                    .push(LogKind::Move, format!("Move {}", describe_move(from, to)));
                self.replace_snapshot(board, current_turn);
            }

            PlayerEvent::MoveApplied {
                from,
                to,
                success: false,
                ..
            } => {
                let text = match (from, to) {
                    (None, None) => "Invalid move".to_string(),
                    _ => format!("Move {} rejected", describe_move(from, to)),
                };
                self.log.push(LogKind::Rejection, text);
            }

            PlayerEvent::GameOver { winner } => {
                self.state.turn.status = GameStatus::Finished;
                self.log
                    .push(LogKind::Info, format!("Game over: {winner} WINS!"));
            }

            PlayerEvent::GameAbandoned { player_id } => {
                self.state.turn.status = GameStatus::Finished;
                self.log.push(
                    LogKind::Info,
                    format!("Player {player_id} has left the game. Game is over."),
                );
            }

            PlayerEvent::ServerError { message } => {
                self.log.push(LogKind::Error, message);
            }

            PlayerEvent::Unrecognized { raw_text } => {
                self.log.push(LogKind::Raw, raw_text);
            }

            PlayerEvent::SessionLeft => {
                if let Some(game_id) = self.state.session.game_id.take() {
                    self.log.push(LogKind::Info, format!("Left game {game_id}"));
                }
                self.clear_game();
            }
        }

        if snapshot.is_some() {
            self.last_snapshot = snapshot;
        }
        self.publish_session();
    }

    /// Point the session at `game_id`, resetting per-game state when it changes.
    ///
    /// Returns whether this is a different game.
    fn enter_game(&mut self, game_id: String) -> bool {
        if self.state.session.game_id.as_deref() == Some(game_id.as_str()) {
            return false;
        }
        self.clear_game();
        self.state.session.game_id = Some(game_id);
        true
    }

    fn clear_game(&mut self) {
        self.state.players = None;
        self.state.board = None;
        self.state.turn = TurnState::default();
        self.last_snapshot = None;
    }

    /// Wholesale replacement; absent parts leave the current value.
    fn replace_snapshot(&mut self, board: Option<Board>, current_turn: Option<String>) {
        if let Some(board) = board {
            self.state.board = Some(board);
        }
        if current_turn.is_some() {
            self.state.turn.current_player_id = current_turn;
        }
    }

    fn publish_session(&self) {
        let session = &self.state.session;
        self.session_tx.send_if_modified(|current| {
            if current == session {
                return false;
            }
            *current = session.clone();
            true
        });
    }
}

fn describe_move(from: Option<Square>, to: Option<Square>) -> String {
    let square = |s: Option<Square>| s.map_or_else(|| "?".to_string(), |s| s.to_string());
    format!("{} → {}", square(from), square(to))
}
