//! Turn-gated click handling.
//!
//! Two states: nothing selected, or one of the local player's pieces picked up
//! and waiting for a destination. Only legality that can be read straight off
//! the board is checked here; the server decides the rest.

use checkers_domain::Square;
use checkers_shared::ClientCommand;

use super::session_store::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Pending(Square),
}

/// A move the local player asked for, not yet confirmed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub from: Square,
    pub to: Square,
}

impl MoveIntent {
    pub fn command(self) -> ClientCommand {
        ClientCommand::move_piece(self.from, self.to)
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    selection: Selection,
    /// Game the selection belongs to
    game_id: Option<String>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Drop a selection that no longer applies: the game changed or the turn passed.
    pub fn sync(&mut self, state: &GameState) {
        if self.game_id != state.session.game_id {
            self.game_id.clone_from(&state.session.game_id);
            self.selection = Selection::Idle;
        }
        if !state.is_my_turn() {
            self.selection = Selection::Idle;
        }
    }

    /// Handle a click on `square`, returning a move when one is complete.
    pub fn click(&mut self, square: Square, state: &GameState) -> Option<MoveIntent> {
        self.sync(state);
        if !state.is_my_turn() {
            return None;
        }
        let own = state.local_color()?;
        let cell = state.board.as_ref()?.get(square);
        let owned = cell.is_some_and(|piece| piece.color == own);

        match self.selection {
            Selection::Idle => {
                if owned {
                    self.selection = Selection::Pending(square);
                }
                None
            }
            Selection::Pending(origin) if origin == square => {
                self.selection = Selection::Idle;
                None
            }
            Selection::Pending(origin) => match cell {
                None => {
                    self.selection = Selection::Idle;
                    Some(MoveIntent { from: origin, to: square })
                }
                Some(_) if owned => {
                    self.selection = Selection::Pending(square);
                    None
                }
                // Opposing piece: keep the current selection.
                Some(_) => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use checkers_domain::{Board, GameStatus, Piece, PieceColor, Players, Session, TurnState};

    use super::*;

    fn sq(x: i64, y: i64) -> Square {
        Square::new(x, y).expect("valid square")
    }

    fn alice_to_move() -> GameState {
        GameState {
            session: Session {
                player_id: Some("alice".into()),
                game_id: Some("G7".into()),
            },
            players: Some(Players::new("alice", Some("bob".to_string()))),
            board: Some(
                Board::empty()
                    .with_piece(sq(2, 2), Piece::man(PieceColor::Light))
                    .with_piece(sq(4, 2), Piece::man(PieceColor::Light))
                    .with_piece(sq(5, 5), Piece::man(PieceColor::Dark)),
            ),
            turn: TurnState {
                current_player_id: Some("alice".into()),
                status: GameStatus::Playing,
            },
        }
    }

    #[test]
    fn test_select_then_move() {
        let state = alice_to_move();
        let mut controller = SelectionController::new();

        assert_eq!(controller.click(sq(2, 2), &state), None);
        assert_eq!(controller.selection(), Selection::Pending(sq(2, 2)));

        let intent = controller.click(sq(3, 3), &state).expect("move emitted");
        assert_eq!(intent.command().to_string(), "move 2 2 3 3");
        assert_eq!(controller.selection(), Selection::Idle);
    }

    #[test]
    fn test_same_square_deselects() {
        let state = alice_to_move();
        let mut controller = SelectionController::new();

        controller.click(sq(2, 2), &state);
        assert_eq!(controller.click(sq(2, 2), &state), None);
        assert_eq!(controller.selection(), Selection::Idle);
    }

    #[test]
    fn test_own_piece_switches_selection() {
        let state = alice_to_move();
        let mut controller = SelectionController::new();

        controller.click(sq(2, 2), &state);
        assert_eq!(controller.click(sq(4, 2), &state), None);
        assert_eq!(controller.selection(), Selection::Pending(sq(4, 2)));
    }

    #[test]
    fn test_opposing_piece_keeps_selection() {
        let state = alice_to_move();
        let mut controller = SelectionController::new();

        controller.click(sq(2, 2), &state);
        assert_eq!(controller.click(sq(5, 5), &state), None);
        assert_eq!(controller.selection(), Selection::Pending(sq(2, 2)));
    }

    #[test]
    fn test_idle_clicks_off_own_pieces_do_nothing() {
        let state = alice_to_move();
        let mut controller = SelectionController::new();

        assert_eq!(controller.click(sq(5, 5), &state), None);
        assert_eq!(controller.click(sq(0, 0), &state), None);
        assert_eq!(controller.selection(), Selection::Idle);
    }

    #[test]
    fn test_turn_gate() {
        let mut controller = SelectionController::new();

        let mut bobs_turn = alice_to_move();
        bobs_turn.turn.current_player_id = Some("bob".into());
        assert_eq!(controller.click(sq(2, 2), &bobs_turn), None);
        assert_eq!(controller.selection(), Selection::Idle);

        for status in [GameStatus::Waiting, GameStatus::Finished] {
            let mut state = alice_to_move();
            state.turn.status = status;
            assert_eq!(controller.click(sq(2, 2), &state), None);
            assert_eq!(controller.selection(), Selection::Idle);
        }
    }

    #[test]
    fn test_turn_change_clears_pending_selection() {
        let mut state = alice_to_move();
        let mut controller = SelectionController::new();
        controller.click(sq(2, 2), &state);

        state.turn.current_player_id = Some("bob".into());
        controller.sync(&state);
        assert_eq!(controller.selection(), Selection::Idle);

        state.turn.current_player_id = Some("alice".into());
        assert_eq!(controller.click(sq(3, 3), &state), None);
    }

    #[test]
    fn test_game_change_clears_pending_selection() {
        let mut state = alice_to_move();
        let mut controller = SelectionController::new();
        controller.click(sq(2, 2), &state);

        state.session.game_id = Some("G8".into());
        assert_eq!(controller.click(sq(3, 3), &state), None);
        assert_eq!(controller.selection(), Selection::Idle);
    }

    #[test]
    fn test_player_two_plays_dark() {
        let mut state = alice_to_move();
        state.players = Some(Players::new("bob", Some("alice".to_string())));
        let mut controller = SelectionController::new();

        assert_eq!(controller.click(sq(2, 2), &state), None);
        assert_eq!(controller.selection(), Selection::Idle);

        controller.click(sq(5, 5), &state);
        assert_eq!(controller.selection(), Selection::Pending(sq(5, 5)));
    }
}
