//! Inbound structured message shapes (Server → Player)
//!
//! The server's JSON messages carry a `type` discriminator. The payloads have
//! drifted over time, so these shapes are deliberately permissive: every
//! historical field name is accepted and most fields are optional. Turning
//! them into one canonical event is the client's job, not this crate's.
//!
//! ## Versioning Policy
//!
//! - New discriminators can be added at the end (forward compatible)
//! - Unknown discriminators deserialize to `Unknown`
//! - A known discriminator with a malformed payload is a decode error

use serde::Deserialize;

/// Messages from the server, keyed by the `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "login_success")]
    LoginSuccess(LoginSuccess),

    #[serde(rename = "register_success")]
    RegisterSuccess(RegisterSuccess),

    #[serde(rename = "game_created")]
    GameCreated(GameCreated),

    #[serde(rename = "game_joined")]
    GameJoined(GameSnapshot),

    #[serde(rename = "game_update")]
    GameUpdate(GameSnapshot),

    #[serde(rename = "MoveResult", alias = "move_result")]
    MoveResult(MoveResult),

    #[serde(rename = "error")]
    Error(ErrorMessage),

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Decode a raw JSON frame.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Identifiers arrive as strings or as bare integers depending on the server build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginSuccess {
    #[serde(alias = "playerId", alias = "player_id", alias = "user")]
    pub username: WireId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RegisterSuccess {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    #[serde(alias = "game_id", alias = "id")]
    pub game_id: WireId,
    #[serde(default, alias = "invite_code")]
    pub invite_code: Option<String>,
}

/// Seat and turn information, nested under `gameInfo` in newer builds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    #[serde(default, alias = "player1_id")]
    pub player1_id: Option<WireId>,
    #[serde(default, alias = "player2_id")]
    pub player2_id: Option<WireId>,
    #[serde(default, alias = "current_turn", alias = "turn")]
    pub current_turn: Option<WireId>,
}

/// Payload shared by `game_joined` and `game_update`.
///
/// Older builds put the seat fields at the top level instead of under `gameInfo`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default, alias = "game_id", alias = "id")]
    pub game_id: Option<WireId>,
    #[serde(default, alias = "game_info")]
    pub game_info: Option<GameInfo>,
    #[serde(default, alias = "player1_id")]
    pub player1_id: Option<WireId>,
    #[serde(default, alias = "player2_id")]
    pub player2_id: Option<WireId>,
    #[serde(default, alias = "current_turn", alias = "turn")]
    pub current_turn: Option<WireId>,
    #[serde(default)]
    pub board: Option<WireBoard>,
}

impl GameSnapshot {
    /// Merge nested and flat seat fields; nested wins when both are present.
    pub fn seat_info(&self) -> GameInfo {
        let nested = self.game_info.clone().unwrap_or_default();
        GameInfo {
            player1_id: nested.player1_id.or_else(|| self.player1_id.clone()),
            player2_id: nested.player2_id.or_else(|| self.player2_id.clone()),
            current_turn: nested.current_turn.or_else(|| self.current_turn.clone()),
        }
    }
}

/// A board square as `{x, y}` or `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireSquare {
    Point { x: i64, y: i64 },
    Pair([i64; 2]),
}

impl WireSquare {
    pub fn coords(self) -> (i64, i64) {
        match self {
            Self::Point { x, y } => (x, y),
            Self::Pair([x, y]) => (x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub success: bool,
    #[serde(default)]
    pub from: Option<WireSquare>,
    #[serde(default)]
    pub to: Option<WireSquare>,
    #[serde(default, alias = "from_x")]
    pub from_x: Option<i64>,
    #[serde(default, alias = "from_y")]
    pub from_y: Option<i64>,
    #[serde(default, alias = "to_x")]
    pub to_x: Option<i64>,
    #[serde(default, alias = "to_y")]
    pub to_y: Option<i64>,
    #[serde(default)]
    pub board: Option<WireBoard>,
    #[serde(default, alias = "current_turn", alias = "turn")]
    pub current_turn: Option<WireId>,
    #[serde(default, alias = "reason")]
    pub message: Option<String>,
}

impl MoveResult {
    /// Origin coordinates from either the nested or the flat shape.
    pub fn from_coords(&self) -> Option<(i64, i64)> {
        self.from
            .map(WireSquare::coords)
            .or_else(|| Some((self.from_x?, self.from_y?)))
    }

    /// Destination coordinates from either the nested or the flat shape.
    pub fn to_coords(&self) -> Option<(i64, i64)> {
        self.to
            .map(WireSquare::coords)
            .or_else(|| Some((self.to_x?, self.to_y?)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorMessage {
    #[serde(default, alias = "error", alias = "reason")]
    pub message: Option<String>,
}

/// One cell of the record-style board: `{"isWhite": true, "isKing": false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePiece {
    #[serde(alias = "is_white")]
    pub is_white: bool,
    #[serde(default, alias = "is_king")]
    pub is_king: bool,
}

/// The two board encodings seen on the wire.
///
/// `Symbols` is the older grid of single-letter markers (`"r"`, `"B"`, ...),
/// `Records` the newer grid of [`WirePiece`] objects. Empty cells are `null`
/// in both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireBoard {
    Symbols(Vec<Vec<Option<String>>>),
    Records(Vec<Vec<Option<WirePiece>>>),
}

impl WireBoard {
    /// The server sends `[]` before a game has started.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Symbols(rows) => rows.is_empty(),
            Self::Records(rows) => rows.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_forward_compatible() {
        let msg = ServerMessage::from_json(r#"{"type":"chat","text":"hi"}"#).expect("decode");
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        assert!(ServerMessage::from_json(r#"{"text":"hi"}"#).is_err());
        assert!(ServerMessage::from_json("BLACK WINS!").is_err());
    }

    #[test]
    fn test_game_joined_nested_and_flat_seats() {
        let nested = r#"{"type":"game_joined","gameId":"G7",
            "gameInfo":{"player1Id":"alice","player2Id":"bob","currentTurn":"Player1"},
            "board":[]}"#;
        let ServerMessage::GameJoined(snapshot) = ServerMessage::from_json(nested).expect("decode")
        else {
            panic!("expected game_joined");
        };
        let seats = snapshot.seat_info();
        assert_eq!(seats.player1_id, Some(WireId::Text("alice".into())));
        assert_eq!(seats.current_turn, Some(WireId::Text("Player1".into())));
        assert!(snapshot.board.as_ref().is_some_and(WireBoard::is_empty));

        let flat = r#"{"type":"game_joined","gameId":12,"player1Id":"alice","currentTurn":"alice"}"#;
        let ServerMessage::GameJoined(snapshot) = ServerMessage::from_json(flat).expect("decode")
        else {
            panic!("expected game_joined");
        };
        assert_eq!(snapshot.game_id.clone().map(WireId::into_string), Some("12".into()));
        assert_eq!(snapshot.seat_info().player2_id, None);
    }

    #[test]
    fn test_board_encodings() {
        let symbols: WireBoard = serde_json::from_str(r#"[["r",null,"B"]]"#).expect("decode");
        assert!(matches!(symbols, WireBoard::Symbols(_)));

        let records: WireBoard =
            serde_json::from_str(r#"[[{"isWhite":true,"isKing":false},null]]"#).expect("decode");
        let WireBoard::Records(rows) = records else {
            panic!("expected records");
        };
        assert_eq!(
            rows[0][0],
            Some(WirePiece {
                is_white: true,
                is_king: false
            })
        );
    }

    #[test]
    fn test_move_result_coordinate_shapes() {
        let nested: MoveResult =
            serde_json::from_str(r#"{"success":true,"from":{"x":2,"y":2},"to":[3,3]}"#)
                .expect("decode");
        assert_eq!(nested.from_coords(), Some((2, 2)));
        assert_eq!(nested.to_coords(), Some((3, 3)));

        let flat: MoveResult =
            serde_json::from_str(r#"{"success":false,"fromX":5,"fromY":1,"toX":4,"toY":0}"#)
                .expect("decode");
        assert_eq!(flat.from_coords(), Some((5, 1)));
        assert_eq!(flat.to_coords(), Some((4, 0)));

        let bare: MoveResult = serde_json::from_str(r#"{"success":false}"#).expect("decode");
        assert_eq!(bare.from_coords(), None);
    }

    #[test]
    fn test_move_result_requires_success_flag() {
        assert!(ServerMessage::from_json(r#"{"type":"MoveResult","from":[1,1]}"#).is_err());
    }
}
