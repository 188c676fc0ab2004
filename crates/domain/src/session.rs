//! Session, seat and turn value types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, PieceColor};

/// Which of the two seats a player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    PlayerOne,
    PlayerTwo,
}

impl Seat {
    /// Player 1 plays light, player 2 plays dark.
    pub fn color(self) -> PieceColor {
        match self {
            Self::PlayerOne => PieceColor::Light,
            Self::PlayerTwo => PieceColor::Dark,
        }
    }
}

impl FromStr for Seat {
    type Err = DomainError;

    /// Parses the relative turn markers the server uses (`Player1` / `Player2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player1" | "player 1" | "player_1" => Ok(Self::PlayerOne),
            "player2" | "player 2" | "player_2" => Ok(Self::PlayerTwo),
            other => Err(DomainError::parse(format!("unknown seat marker: {other}"))),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerOne => write!(f, "Player1"),
            Self::PlayerTwo => write!(f, "Player2"),
        }
    }
}

/// Lifecycle of a single game.
///
/// Ordered so that a status can only move forward within one game:
/// `Waiting < Playing < Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl GameStatus {
    /// Move forward to `next`, never backwards.
    pub fn advance(self, next: GameStatus) -> GameStatus {
        self.max(next)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Whose turn it is and where the game stands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnState {
    pub current_player_id: Option<String>,
    pub status: GameStatus,
}

/// The two seated players. Player 2 is absent until someone joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub player1_id: String,
    pub player2_id: Option<String>,
}

impl Players {
    pub fn new(player1_id: impl Into<String>, player2_id: Option<String>) -> Self {
        Self {
            player1_id: player1_id.into(),
            player2_id,
        }
    }

    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        if self.player1_id == player_id {
            Some(Seat::PlayerOne)
        } else if self.player2_id.as_deref() == Some(player_id) {
            Some(Seat::PlayerTwo)
        } else {
            None
        }
    }

    pub fn id_for(&self, seat: Seat) -> Option<&str> {
        match seat {
            Seat::PlayerOne => Some(self.player1_id.as_str()),
            Seat::PlayerTwo => self.player2_id.as_deref(),
        }
    }
}

/// Identity of the local player and the game they sit in.
///
/// Survives reconnects; only an explicit leave clears the game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub player_id: Option<String>,
    pub game_id: Option<String>,
}

impl Session {
    /// The game to re-announce after a reconnect. Requires both a player and a game.
    pub fn rejoin_target(&self) -> Option<&str> {
        match (&self.player_id, &self.game_id) {
            (Some(_), Some(game_id)) => Some(game_id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_markers() {
        assert_eq!("Player1".parse::<Seat>(), Ok(Seat::PlayerOne));
        assert_eq!("PLAYER2".parse::<Seat>(), Ok(Seat::PlayerTwo));
        assert!("alice".parse::<Seat>().is_err());
        assert_eq!(Seat::PlayerTwo.color(), PieceColor::Dark);
    }

    #[test]
    fn test_status_only_moves_forward() {
        assert_eq!(
            GameStatus::Waiting.advance(GameStatus::Playing),
            GameStatus::Playing
        );
        assert_eq!(
            GameStatus::Finished.advance(GameStatus::Playing),
            GameStatus::Finished
        );
    }

    #[test]
    fn test_players_lookup() {
        let players = Players::new("alice", Some("bob".to_string()));
        assert_eq!(players.seat_of("bob"), Some(Seat::PlayerTwo));
        assert_eq!(players.seat_of("carol"), None);
        assert_eq!(players.id_for(Seat::PlayerOne), Some("alice"));

        let waiting = Players::new("alice", None);
        assert_eq!(waiting.id_for(Seat::PlayerTwo), None);
    }

    #[test]
    fn test_rejoin_target_needs_player_and_game() {
        let mut session = Session::default();
        assert_eq!(session.rejoin_target(), None);

        session.game_id = Some("G7".into());
        assert_eq!(session.rejoin_target(), None);

        session.player_id = Some("alice".into());
        assert_eq!(session.rejoin_target(), Some("G7"));
    }
}
