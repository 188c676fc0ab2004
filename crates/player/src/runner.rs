//! Terminal front end.
//!
//! One task owns the [`GameService`] and multiplexes inbound frames, connection
//! transitions, stdin and Ctrl-C. Log lines and board changes go to stdout;
//! tracing output goes to stderr.

use std::sync::Arc;

use checkers_domain::{Board, PieceColor};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::services::GameService;
use crate::config::PlayerConfig;
use crate::infrastructure::websocket::ChannelManager;
use crate::state::{GameState, Selection, SessionStore};

const USAGE: &str = "\
Commands:
  login <username> <password>
  register <email> <username> <password>
  create                 create a game
  join <game id>         join a game
  leave                  leave the current game
  click <x> <y>          select a piece, then click its destination
  state                  ask the server for the current game state
  board                  show the board
  help                   show this help (and the server's)
  quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Login { username: String, password: String },
    Register {
        email: String,
        username: String,
        password: String,
    },
    Create,
    Join { game_id: String },
    Leave,
    Click { x: i64, y: i64 },
    State,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl UserInput {
    /// Parse a command line; `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = words.split_first() else {
            return Ok(None);
        };

        let input = match (command.to_ascii_lowercase().as_str(), args) {
            ("login", [username, password]) => Self::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err(InputError::Usage("login <username> <password>")),
            ("register", [email, username, password]) => Self::Register {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            },
            ("register", _) => {
                return Err(InputError::Usage("register <email> <username> <password>"))
            }
            ("create", []) => Self::Create,
            ("join", [game_id]) => Self::Join {
                game_id: game_id.to_string(),
            },
            ("join", _) => return Err(InputError::Usage("join <game id>")),
            ("leave", []) => Self::Leave,
            ("click", [x, y]) => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => Self::Click { x, y },
                _ => return Err(InputError::Usage("click <x> <y>")),
            },
            ("click", _) => return Err(InputError::Usage("click <x> <y>")),
            ("state", []) => Self::State,
            ("board", []) => Self::Board,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (other, _) => return Err(InputError::Unknown(other.to_string())),
        };
        Ok(Some(input))
    }
}

pub async fn run(config: PlayerConfig) -> anyhow::Result<()> {
    let store = SessionStore::new(config.log_capacity);
    let (manager, mut frames) =
        ChannelManager::spawn(config.ws_url.as_str(), config.reconnect, store.session_watch());
    // Released on every exit path, including `?` below.
    let _guard = manager.guard();
    let mut connection = manager.observer();
    let mut service = GameService::with_store(Arc::new(manager.clone()), store);

    tracing::info!(url = %config.ws_url, "Starting checkers player");
    println!("{USAGE}");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0;
    let mut shown_board: Option<Board> = None;

    loop {
        tokio::select! {
            Some(frame) = frames.recv() => service.handle_frame(&frame),
            state = connection.changed() => match state {
                Some(state) => println!("[connection: {state}]"),
                None => break,
            },
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                match UserInput::parse(&line) {
                    Ok(Some(UserInput::Quit)) => break,
                    Ok(Some(input)) => dispatch(&mut service, input),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            _ = &mut ctrl_c => break,
        }

        for entry in service.log().entries_since(printed) {
            println!("{entry}");
        }
        printed = service.log().next_seq();

        if service.state().board != shown_board {
            shown_board = service.state().board;
            println!("{}", render(service.state(), service.selection()));
        }
    }

    manager.close().await;
    Ok(())
}

fn dispatch(service: &mut GameService, input: UserInput) {
    match input {
        UserInput::Login { username, password } => {
            service.login(&username, &password);
        }
        UserInput::Register {
            email,
            username,
            password,
        } => {
            service.register(&email, &username, &password);
        }
        UserInput::Create => {
            service.create_game();
        }
        UserInput::Join { game_id } => {
            service.join_game(&game_id);
        }
        UserInput::Leave => {
            service.leave_game();
        }
        UserInput::Click { x, y } => {
            if service.click(x, y).is_none() {
                if let Selection::Pending(square) = service.selection() {
                    println!("Selected {square}");
                }
            }
        }
        UserInput::State => {
            service.request_state();
        }
        UserInput::Board => println!("{}", render(service.state(), service.selection())),
        UserInput::Help => {
            println!("{USAGE}");
            service.request_help();
        }
        UserInput::Quit => {}
    }
}

/// Board plus a status line.
pub fn render(state: &GameState, selection: Selection) -> String {
    let mut out = match &state.board {
        Some(board) => board.to_string(),
        None => "(no board yet)\n".to_string(),
    };

    if let (Some(game_id), Some(players)) = (&state.session.game_id, &state.players) {
        let opponent = players.player2_id.as_deref().unwrap_or("?");
        out.push_str(&format!(
            "Game {game_id}: {} (W) vs {opponent} (B) | {}",
            players.player1_id, state.turn.status
        ));
        if let Some(turn) = &state.turn.current_player_id {
            out.push_str(&format!(" | turn: {turn}"));
        }
        if state.is_my_turn() {
            out.push_str(" | your move");
        }
        if let Some(board) = &state.board {
            out.push_str(&format!(
                " | pieces W {} B {}",
                board.count(PieceColor::Light),
                board.count(PieceColor::Dark)
            ));
        }
    }
    if let Selection::Pending(square) = selection {
        out.push_str(&format!("\nSelected {square}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use checkers_domain::{GameStatus, Piece, Players, Session, Square, TurnState};

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            UserInput::parse("login alice pw"),
            Ok(Some(UserInput::Login {
                username: "alice".into(),
                password: "pw".into()
            }))
        );
        assert_eq!(
            UserInput::parse("  CLICK 2 3 "),
            Ok(Some(UserInput::Click { x: 2, y: 3 }))
        );
        assert_eq!(
            UserInput::parse("join G7"),
            Ok(Some(UserInput::Join {
                game_id: "G7".into()
            }))
        );
        assert_eq!(UserInput::parse("exit"), Ok(Some(UserInput::Quit)));
        assert_eq!(UserInput::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            UserInput::parse("login alice"),
            Err(InputError::Usage("login <username> <password>"))
        );
        assert_eq!(
            UserInput::parse("click a b"),
            Err(InputError::Usage("click <x> <y>"))
        );
        assert_eq!(
            UserInput::parse("dance"),
            Err(InputError::Unknown("dance".into()))
        );
    }

    #[test]
    fn test_render_status_line() {
        let square = Square::new(2, 2).expect("valid square");
        let state = GameState {
            session: Session {
                player_id: Some("alice".into()),
                game_id: Some("G7".into()),
            },
            players: Some(Players::new("alice", Some("bob".to_string()))),
            board: Some(Board::empty().with_piece(square, Piece::man(PieceColor::Light))),
            turn: TurnState {
                current_player_id: Some("alice".into()),
                status: GameStatus::Playing,
            },
        };

        let text = render(&state, Selection::Pending(square));
        assert!(text.starts_with("  0 1 2 3 4 5 6 7"));
        assert!(text.contains(
            "Game G7: alice (W) vs bob (B) | playing | turn: alice | your move | pieces W 1 B 0"
        ));
        assert!(text.ends_with("Selected (2, 2)"));

        assert!(render(&GameState::default(), Selection::Idle).starts_with("(no board yet)"));
    }
}
