use super::board::{Board, LegalColumns, Outcome};
use super::player::Player;
use crate::error::MoveError;

/// A board together with the side to move.
///
/// The outcome is cached and refreshed on every move using the cheap
/// last-drop check, so rollouts never rescan the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Outcome,
}

impl GameState {
    /// Create initial game state with `first` to move.
    pub fn initial(first: Player) -> Self {
        GameState {
            board: Board::new(),
            current_player: first,
            outcome: Outcome::Ongoing,
        }
    }

    /// Wrap an existing board, e.g. one parsed from a diagram.
    pub fn from_board(board: Board, to_move: Player) -> Self {
        GameState {
            board,
            current_player: to_move,
            outcome: board.outcome(),
        }
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Get list of legal columns (not full); empty once the game is over.
    pub fn legal_actions(&self) -> LegalColumns {
        if self.is_terminal() {
            return LegalColumns::new();
        }
        self.board.legal_columns()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply move mutably (for rollouts and the game session)
    pub fn apply_move_mut(&mut self, column: usize) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let row = self.board.drop(column, self.current_player.to_cell())?;

        if self.board.check_win(row, column) {
            self.outcome = self.current_player.winning_outcome();
        } else if self.board.is_full() {
            self.outcome = Outcome::Draw;
        }

        self.current_player = self.current_player.other();

        Ok(())
    }
}
