//! Translates raw server frames into `PlayerEvent`s for the application layer
//!
//! This module is the only place that knows the server's wire shapes. Structured
//! JSON messages are decoded through `checkers_shared::ServerMessage` and then
//! normalized; frames that are not JSON fall back to the plain-text
//! announcements the server writes. Whatever cannot be mapped comes out as
//! `PlayerEvent::Unrecognized` carrying the frame verbatim.
//!
//! # Normalization
//!
//! - Boards arrive as a grid of letters or a grid of `{isWhite, isKing}`
//!   records; both become a `checkers_domain::Board`. `[]` means "no board yet".
//! - The turn holder arrives as a player id or as a relative `Player1`/`Player2`
//!   marker; markers are resolved against the player pair, so events only
//!   ever carry literal ids.

use std::sync::LazyLock;

use checkers_domain::{Board, DomainError, Piece, PieceColor, Players, Seat, Square, BOARD_SIZE};
use checkers_shared::{GameSnapshot, MoveResult, ServerMessage, WireBoard, WireId, WirePiece};
use regex_lite::Regex;
use thiserror::Error;

use crate::ports::outbound::PlayerEvent;

/// What the client already knows that a frame may refer to without repeating.
///
/// `MoveResult` and `game_update` carry relative turn markers but not the
/// player pair, so resolving them needs the pair from the last join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolContext {
    pub players: Option<Players>,
}

/// Why a structured frame could not be normalized.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown board symbol {0:?}")]
    UnknownSymbol(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Parse one inbound frame with no prior knowledge.
///
/// Returns `None` only for blank frames.
pub fn parse(raw: &str) -> Option<PlayerEvent> {
    parse_with(raw, &ProtocolContext::default())
}

/// Parse one inbound frame, resolving relative references through `ctx`.
pub fn parse_with(raw: &str, ctx: &ProtocolContext) -> Option<PlayerEvent> {
    let frame = raw.trim();
    if frame.is_empty() {
        return None;
    }

    let event = match ServerMessage::from_json(frame) {
        Ok(message) => translate(message, raw, ctx).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed server message");
            unrecognized(raw)
        }),
        Err(decode_error) => parse_text(frame).unwrap_or_else(|| {
            tracing::debug!(error = %decode_error, "Frame matched no known shape");
            unrecognized(raw)
        }),
    };
    Some(event)
}

fn unrecognized(raw: &str) -> PlayerEvent {
    PlayerEvent::Unrecognized {
        raw_text: raw.to_string(),
    }
}

/// Translate a decoded ServerMessage into a PlayerEvent
fn translate(
    message: ServerMessage,
    raw: &str,
    ctx: &ProtocolContext,
) -> Result<PlayerEvent, TranslateError> {
    let event = match message {
        ServerMessage::LoginSuccess(login) => PlayerEvent::LoggedIn {
            username: login.username.into_string(),
        },

        ServerMessage::RegisterSuccess(_) => PlayerEvent::Registered,

        ServerMessage::GameCreated(created) => PlayerEvent::GameCreated {
            game_id: created.game_id.into_string(),
            invite_code: created.invite_code,
        },

        ServerMessage::GameJoined(snapshot) => translate_joined(snapshot)?,

        ServerMessage::GameUpdate(snapshot) => translate_update(snapshot, ctx)?,

        ServerMessage::MoveResult(result) => translate_move(result, ctx)?,

        ServerMessage::Error(error) => PlayerEvent::ServerError {
            message: error
                .message
                .unwrap_or_else(|| "Unknown server error".to_string()),
        },

        ServerMessage::Unknown => unrecognized(raw),
    };
    Ok(event)
}

fn snapshot_players(snapshot: &GameSnapshot) -> Option<Players> {
    let seats = snapshot.seat_info();
    let player1 = seats.player1_id.map(WireId::into_string)?;
    let player2 = seats
        .player2_id
        .map(WireId::into_string)
        .filter(|id| !id.is_empty());
    Some(Players::new(player1, player2))
}

fn translate_joined(snapshot: GameSnapshot) -> Result<PlayerEvent, TranslateError> {
    let players = snapshot_players(&snapshot).ok_or(TranslateError::MissingField("player1Id"))?;
    let game_id = snapshot
        .game_id
        .clone()
        .ok_or(TranslateError::MissingField("gameId"))?
        .into_string();
    let current_turn = snapshot
        .seat_info()
        .current_turn
        .and_then(|marker| resolve_turn(marker, Some(&players)));

    Ok(PlayerEvent::GameJoined {
        game_id,
        board: board_from_wire(snapshot.board)?,
        players,
        current_turn,
    })
}

fn translate_update(
    snapshot: GameSnapshot,
    ctx: &ProtocolContext,
) -> Result<PlayerEvent, TranslateError> {
    let players = snapshot_players(&snapshot).or_else(|| ctx.players.clone());
    let current_turn = snapshot
        .seat_info()
        .current_turn
        .and_then(|marker| resolve_turn(marker, players.as_ref()));

    Ok(PlayerEvent::GameUpdated {
        board: board_from_wire(snapshot.board)?,
        current_turn,
    })
}

fn translate_move(result: MoveResult, ctx: &ProtocolContext) -> Result<PlayerEvent, TranslateError> {
    let from = result.from_coords().map(Square::try_from).transpose()?;
    let to = result.to_coords().map(Square::try_from).transpose()?;
    if !result.success {
        if let Some(reason) = &result.message {
            tracing::debug!(reason, "Server rejected move");
        }
    }
    let current_turn = result
        .current_turn
        .and_then(|marker| resolve_turn(marker, ctx.players.as_ref()));

    Ok(PlayerEvent::MoveApplied {
        from,
        to,
        success: result.success,
        board: board_from_wire(result.board)?,
        current_turn,
    })
}

/// Resolve a turn marker to a literal player id.
///
/// A marker equal to a seated player's id is taken as that id, so a player
/// literally named `Player1` still resolves to themselves. Relative markers
/// without a known pair resolve to nothing.
pub fn resolve_turn(marker: WireId, players: Option<&Players>) -> Option<String> {
    let marker = marker.into_string();
    if marker.is_empty() {
        return None;
    }
    if players.is_some_and(|p| p.seat_of(&marker).is_some()) {
        return Some(marker);
    }
    match marker.parse::<Seat>() {
        Ok(seat) => players.and_then(|p| p.id_for(seat)).map(str::to_string),
        Err(_) => Some(marker),
    }
}

/// Normalize either board encoding; `None` or `[]` means no board.
pub fn board_from_wire(board: Option<WireBoard>) -> Result<Option<Board>, TranslateError> {
    let Some(board) = board.filter(|b| !b.is_empty()) else {
        return Ok(None);
    };
    let rows = match board {
        WireBoard::Symbols(rows) => rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| symbol_piece(cell.as_deref()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?,
        WireBoard::Records(rows) => rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(record_piece)).collect())
            .collect(),
    };
    Ok(Some(Board::from_rows(rows)?))
}

/// Letter-grid cell: lowercase is a man, uppercase (or a trailing `K`) a king.
fn symbol_piece(symbol: Option<&str>) -> Result<Option<Piece>, TranslateError> {
    let piece = match symbol.map(str::trim).unwrap_or_default() {
        "" | "." => None,
        "r" | "w" => Some(Piece::man(PieceColor::Light)),
        "R" | "W" | "RK" | "WK" | "rk" | "wk" => Some(Piece::king(PieceColor::Light)),
        "b" => Some(Piece::man(PieceColor::Dark)),
        "B" | "BK" | "bk" => Some(Piece::king(PieceColor::Dark)),
        other => return Err(TranslateError::UnknownSymbol(other.to_string())),
    };
    Ok(piece)
}

fn record_piece(record: WirePiece) -> Piece {
    let color = if record.is_white {
        PieceColor::Light
    } else {
        PieceColor::Dark
    };
    Piece {
        color,
        is_king: record.is_king,
    }
}

// =============================================================================
// Plain-text announcements
// =============================================================================

static WINS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z]+) WINS!").expect("valid regex"));
static SNAPSHOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Game (\S+) - Player1: (\S*), Player2: (\S*), Turn: (\S+)").expect("valid regex")
});
static LOGGED_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Logged in as (\S+)").expect("valid regex"));
static CREATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Game created with ID: (\S+)").expect("valid regex"));
static LEFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Player (\S+) has left the game").expect("valid regex"));
static INVALID_MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Invalid move\b").expect("valid regex"));

/// Match the server's human-readable lines. The win token is checked first
/// because it can trail other output in the same frame.
fn parse_text(frame: &str) -> Option<PlayerEvent> {
    if let Some(caps) = WINS.captures(frame) {
        return Some(PlayerEvent::GameOver {
            winner: caps[1].to_string(),
        });
    }
    if let Some(caps) = SNAPSHOT.captures(frame) {
        return parse_ascii_snapshot(frame, &caps);
    }
    if let Some(caps) = LOGGED_IN.captures(frame) {
        return Some(PlayerEvent::LoggedIn {
            username: caps[1].to_string(),
        });
    }
    if let Some(caps) = CREATED.captures(frame) {
        return Some(PlayerEvent::GameCreated {
            game_id: caps[1].to_string(),
            invite_code: None,
        });
    }
    if let Some(caps) = LEFT.captures(frame) {
        return Some(PlayerEvent::GameAbandoned {
            player_id: caps[1].to_string(),
        });
    }
    if INVALID_MOVE.is_match(frame) {
        return Some(PlayerEvent::MoveApplied {
            from: None,
            to: None,
            success: false,
            board: None,
            current_turn: None,
        });
    }
    None
}

/// `Game <id> - Player1: <a>, Player2: <b>, Turn: PlayerN` plus the ASCII grid.
fn parse_ascii_snapshot(frame: &str, caps: &regex_lite::Captures<'_>) -> Option<PlayerEvent> {
    let player2 = Some(caps[3].to_string()).filter(|id| !id.is_empty());
    let players = Players::new(&caps[2], player2);
    let current_turn = resolve_turn(WireId::Text(caps[4].to_string()), Some(&players));

    let grid: Vec<&str> = frame
        .lines()
        .skip(1)
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.trim() != "0 1 2 3 4 5 6 7")
        .take(BOARD_SIZE)
        .collect();
    let board = if grid.is_empty() {
        None
    } else {
        Some(parse_ascii_grid(&grid)?)
    };

    Some(PlayerEvent::GameJoined {
        game_id: caps[1].to_string(),
        players,
        board,
        current_turn,
    })
}

fn parse_ascii_grid(lines: &[&str]) -> Option<Board> {
    if lines.len() != BOARD_SIZE {
        return None;
    }
    let mut rows = Vec::with_capacity(BOARD_SIZE);
    for (y, line) in lines.iter().enumerate() {
        let body = line.strip_prefix(&format!("{y} "))?;
        let body = format!("{body:<width$}", width = BOARD_SIZE * 2);
        let row = (0..BOARD_SIZE)
            .map(|x| ascii_cell(body.get(x * 2..x * 2 + 2)?))
            .collect::<Option<Vec<_>>>()?;
        rows.push(row);
    }
    Board::from_rows(rows).ok()
}

/// Two-character ASCII cell; `Some(None)` is an empty square.
fn ascii_cell(cell: &str) -> Option<Option<Piece>> {
    match cell {
        "W " => Some(Some(Piece::man(PieceColor::Light))),
        "WK" => Some(Some(Piece::king(PieceColor::Light))),
        "B " => Some(Some(Piece::man(PieceColor::Dark))),
        "BK" => Some(Some(Piece::king(PieceColor::Dark))),
        ". " | "  " => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(x: i64, y: i64) -> Square {
        Square::new(x, y).expect("valid square")
    }

    fn record_grid(first: &str) -> String {
        let mut rows = Vec::new();
        for y in 0..8 {
            let cells: Vec<&str> = (0..8)
                .map(|x| if x == 0 && y == 0 { first } else { "null" })
                .collect();
            rows.push(format!("[{}]", cells.join(",")));
        }
        format!("[{}]", rows.join(","))
    }

    fn symbol_grid(first: &str) -> String {
        record_grid(&format!("\"{first}\""))
    }

    fn alice_bob() -> ProtocolContext {
        ProtocolContext {
            players: Some(Players::new("alice", Some("bob".to_string()))),
        }
    }

    #[test]
    fn test_blank_frames_produce_nothing() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \n\t "), None);
    }

    #[test]
    fn test_game_joined_with_records_and_relative_turn() {
        let raw = format!(
            r#"{{"type":"game_joined","gameId":"G7","gameInfo":{{"player1Id":"alice","player2Id":"bob","currentTurn":"Player1"}},"board":{}}}"#,
            record_grid(r#"{"isWhite":true,"isKing":false}"#)
        );

        let Some(PlayerEvent::GameJoined {
            game_id,
            players,
            board,
            current_turn,
        }) = parse(&raw)
        else {
            panic!("expected GameJoined");
        };
        assert_eq!(game_id, "G7");
        assert_eq!(players, Players::new("alice", Some("bob".to_string())));
        assert_eq!(current_turn.as_deref(), Some("alice"));
        let board = board.expect("board present");
        assert_eq!(board.get(sq(0, 0)), Some(Piece::man(PieceColor::Light)));
        assert_eq!(board.count(PieceColor::Light), 1);
    }

    #[test]
    fn test_both_board_encodings_normalize_identically() {
        let symbols = format!(
            r#"{{"type":"game_joined","gameId":"G7","player1Id":"alice","player2Id":"bob","currentTurn":"alice","board":{}}}"#,
            symbol_grid("r")
        );
        let records = format!(
            r#"{{"type":"game_joined","gameId":"G7","gameInfo":{{"player1Id":"alice","player2Id":"bob","currentTurn":"Player1"}},"board":{}}}"#,
            record_grid(r#"{"isWhite":true,"isKing":false}"#)
        );

        assert_eq!(parse(&symbols), parse(&records));
    }

    #[test]
    fn test_symbol_table() {
        assert_eq!(symbol_piece(Some("w")).ok().flatten(), Some(Piece::man(PieceColor::Light)));
        assert_eq!(symbol_piece(Some("R")).ok().flatten(), Some(Piece::king(PieceColor::Light)));
        assert_eq!(symbol_piece(Some("b")).ok().flatten(), Some(Piece::man(PieceColor::Dark)));
        assert_eq!(symbol_piece(Some("B")).ok().flatten(), Some(Piece::king(PieceColor::Dark)));
        assert!(matches!(symbol_piece(Some(" ")), Ok(None)));
        assert!(matches!(symbol_piece(None), Ok(None)));
        assert!(matches!(symbol_piece(Some("x")), Err(TranslateError::UnknownSymbol(_))));
    }

    #[test]
    fn test_empty_board_means_no_board_yet() {
        let raw = r#"{"type":"game_joined","gameId":"G7","gameInfo":{"player1Id":"alice"},"board":[]}"#;
        let Some(PlayerEvent::GameJoined {
            board,
            players,
            current_turn,
            ..
        }) = parse(raw)
        else {
            panic!("expected GameJoined");
        };
        assert_eq!(board, None);
        assert_eq!(players.player2_id, None);
        assert_eq!(current_turn, None);
    }

    #[test]
    fn test_bad_board_shapes_are_unrecognized() {
        let short = r#"{"type":"game_joined","gameId":"G7","player1Id":"alice","board":[["r"]]}"#;
        assert_eq!(
            parse(short),
            Some(PlayerEvent::Unrecognized {
                raw_text: short.to_string()
            })
        );

        let unknown = format!(
            r#"{{"type":"game_joined","gameId":"G7","player1Id":"alice","board":{}}}"#,
            symbol_grid("Q")
        );
        assert!(matches!(parse(&unknown), Some(PlayerEvent::Unrecognized { .. })));
    }

    #[test]
    fn test_game_joined_requires_game_and_first_player() {
        let raw = r#"{"type":"game_joined","gameInfo":{"player1Id":"alice"}}"#;
        assert!(matches!(parse(raw), Some(PlayerEvent::Unrecognized { .. })));

        let raw = r#"{"type":"game_joined","gameId":"G7"}"#;
        assert!(matches!(parse(raw), Some(PlayerEvent::Unrecognized { .. })));
    }

    #[test]
    fn test_move_result_shapes() {
        let nested = r#"{"type":"MoveResult","success":true,"from":{"x":2,"y":2},"to":[3,3],"currentTurn":"Player2"}"#;
        assert_eq!(
            parse_with(nested, &alice_bob()),
            Some(PlayerEvent::MoveApplied {
                from: Some(sq(2, 2)),
                to: Some(sq(3, 3)),
                success: true,
                board: None,
                current_turn: Some("bob".to_string()),
            })
        );

        let flat = r#"{"type":"move_result","success":false,"fromX":2,"fromY":2,"toX":3,"toY":3}"#;
        assert_eq!(
            parse(flat),
            Some(PlayerEvent::MoveApplied {
                from: Some(sq(2, 2)),
                to: Some(sq(3, 3)),
                success: false,
                board: None,
                current_turn: None,
            })
        );
    }

    #[test]
    fn test_relative_turn_without_players_is_dropped() {
        let raw = r#"{"type":"MoveResult","success":true,"currentTurn":"Player1"}"#;
        let Some(PlayerEvent::MoveApplied { current_turn, .. }) = parse(raw) else {
            panic!("expected MoveApplied");
        };
        assert_eq!(current_turn, None);
    }

    #[test]
    fn test_resolve_turn_prefers_literal_ids() {
        let players = Players::new("Player2", Some("bob".to_string()));
        assert_eq!(
            resolve_turn(WireId::Text("Player2".into()), Some(&players)).as_deref(),
            Some("Player2")
        );
        assert_eq!(
            resolve_turn(WireId::Text("player1".into()), Some(&players)).as_deref(),
            Some("Player2")
        );
        assert_eq!(
            resolve_turn(WireId::Number(42), None).as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_game_update_uses_context_players() {
        let raw = format!(
            r#"{{"type":"game_update","board":{},"currentTurn":"Player2"}}"#,
            symbol_grid("b")
        );
        let Some(PlayerEvent::GameUpdated {
            board,
            current_turn,
        }) = parse_with(&raw, &alice_bob())
        else {
            panic!("expected GameUpdated");
        };
        assert_eq!(current_turn.as_deref(), Some("bob"));
        assert_eq!(
            board.and_then(|b| b.get(sq(0, 0))),
            Some(Piece::man(PieceColor::Dark))
        );
    }

    #[test]
    fn test_simple_messages() {
        assert_eq!(
            parse(r#"{"type":"login_success","username":"alice"}"#),
            Some(PlayerEvent::LoggedIn {
                username: "alice".into()
            })
        );
        assert_eq!(
            parse(r#"{"type":"register_success"}"#),
            Some(PlayerEvent::Registered)
        );
        assert_eq!(
            parse(r#"{"type":"game_created","gameId":12,"inviteCode":"XYZ"}"#),
            Some(PlayerEvent::GameCreated {
                game_id: "12".into(),
                invite_code: Some("XYZ".into())
            })
        );
        assert_eq!(
            parse(r#"{"type":"error","message":"Game is full"}"#),
            Some(PlayerEvent::ServerError {
                message: "Game is full".into()
            })
        );
    }

    #[test]
    fn test_unknown_discriminator_keeps_raw_text() {
        let raw = "  {\"type\":\"chat\",\"text\":\"hi\"}\n";
        assert_eq!(
            parse(raw),
            Some(PlayerEvent::Unrecognized {
                raw_text: raw.to_string()
            })
        );
    }

    #[test]
    fn test_win_announcement() {
        assert_eq!(
            parse("BLACK WINS!"),
            Some(PlayerEvent::GameOver {
                winner: "BLACK".into()
            })
        );
        assert_eq!(
            parse("WHITE WINS! Player alice is victorious!\n"),
            Some(PlayerEvent::GameOver {
                winner: "WHITE".into()
            })
        );
    }

    #[test]
    fn test_plain_text_announcements() {
        assert_eq!(
            parse("Logged in as alice\n"),
            Some(PlayerEvent::LoggedIn {
                username: "alice".into()
            })
        );
        assert_eq!(
            parse("Game created with ID: 3"),
            Some(PlayerEvent::GameCreated {
                game_id: "3".into(),
                invite_code: None
            })
        );
        assert_eq!(
            parse("Player bob has left the game. Game is now over."),
            Some(PlayerEvent::GameAbandoned {
                player_id: "bob".into()
            })
        );
        assert!(matches!(
            parse("Invalid move"),
            Some(PlayerEvent::MoveApplied { success: false, from: None, .. })
        ));
        assert_eq!(
            parse("hello there"),
            Some(PlayerEvent::Unrecognized {
                raw_text: "hello there".into()
            })
        );
    }

    #[test]
    fn test_ascii_snapshot() {
        let frame = "Game 3 - Player1: alice, Player2: bob, Turn: Player2\n\n\
                     \x20 0 1 2 3 4 5 6 7\n\
                     0   W   W   W   W \n\
                     1 W   W   W   W   \n\
                     2   W   W   W   W \n\
                     3 .   .   .   .   \n\
                     4   .   .   .   . \n\
                     5 B   B   B   B   \n\
                     6   B   B   B   BK\n\
                     7 B   B   B   B   \n";

        let Some(PlayerEvent::GameJoined {
            game_id,
            players,
            board,
            current_turn,
        }) = parse(frame)
        else {
            panic!("expected GameJoined");
        };
        assert_eq!(game_id, "3");
        assert_eq!(players, Players::new("alice", Some("bob".to_string())));
        assert_eq!(current_turn.as_deref(), Some("bob"));

        let board = board.expect("board present");
        assert_eq!(board.get(sq(1, 0)), Some(Piece::man(PieceColor::Light)));
        assert_eq!(board.get(sq(0, 0)), None);
        assert_eq!(board.get(sq(7, 6)), Some(Piece::king(PieceColor::Dark)));
        assert_eq!(board.count(PieceColor::Light), 12);
        assert_eq!(board.count(PieceColor::Dark), 12);
    }

    #[test]
    fn test_ascii_snapshot_waiting_for_opponent() {
        let Some(PlayerEvent::GameJoined {
            players, board, ..
        }) = parse("Game 4 - Player1: alice, Player2: , Turn: Player1")
        else {
            panic!("expected GameJoined");
        };
        assert_eq!(players.player2_id, None);
        assert_eq!(board, None);
    }

    #[test]
    fn test_truncated_ascii_grid_is_unrecognized() {
        let frame = "Game 3 - Player1: alice, Player2: bob, Turn: Player1\n0   W   W   W   W";
        assert!(matches!(parse(frame), Some(PlayerEvent::Unrecognized { .. })));
    }

    #[test]
    fn test_arbitrary_input_never_panics() {
        let inputs = [
            "{",
            "[]",
            "null",
            "{\"type\":5}",
            "{\"type\":\"MoveResult\"}",
            "{\"type\":\"MoveResult\",\"success\":true,\"from\":[9,9]}",
            "\u{0}\u{ffff}",
            "Game",
            "Game x - Player1: a, Player2: b, Turn: Player1\n0 ZZ",
        ];
        for input in inputs {
            assert!(parse(input).is_some(), "no event for {input:?}");
        }
    }
}
