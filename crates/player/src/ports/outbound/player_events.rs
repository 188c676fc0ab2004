//! Player events - the canonical form of every fact the server can assert
//!
//! Adapters (`message_translator.rs`) produce a `PlayerEvent` from each inbound
//! frame, whatever wire shape it arrived in. The session store consumes exactly
//! this type, so there is one representation downstream of the translator.

use checkers_domain::{Board, Players, Square};

/// A normalized server event.
///
/// Player ids in `current_turn` are always literal ids: relative
/// `Player1`/`Player2` markers are resolved before an event is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    LoggedIn {
        username: String,
    },
    Registered,
    GameCreated {
        game_id: String,
        invite_code: Option<String>,
    },
    GameJoined {
        game_id: String,
        players: Players,
        /// `None` when the server has no board yet (sent as `[]`)
        board: Option<Board>,
        current_turn: Option<String>,
    },
    /// Full or partial snapshot pushed without a move result (`game_update`)
    GameUpdated {
        board: Option<Board>,
        current_turn: Option<String>,
    },
    MoveApplied {
        from: Option<Square>,
        to: Option<Square>,
        success: bool,
        board: Option<Board>,
        current_turn: Option<String>,
    },
    GameOver {
        winner: String,
    },
    /// A player left mid-game; the server ends the game
    GameAbandoned {
        player_id: String,
    },
    ServerError {
        message: String,
    },
    /// Anything the translator could not map, carried verbatim
    Unrecognized {
        raw_text: String,
    },
    /// Client-originated: the local player left their game
    SessionLeft,
}

impl PlayerEvent {
    /// Events whose whole payload is an authoritative snapshot; redelivery of
    /// an identical one must be a no-op.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            Self::GameJoined { .. }
                | Self::GameUpdated { .. }
                | Self::MoveApplied { success: true, .. }
        )
    }
}
