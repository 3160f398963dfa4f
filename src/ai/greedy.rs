use std::time::Instant;

use crate::error::SearchError;
use crate::game::GameState;

use super::agent::{Agent, SearchDetail, SearchReport};
use super::heuristic::{Heuristic, WindowHeuristic};

/// One-ply agent: plays the column whose resulting board scores best for the
/// side to move. Ties go to the lowest column.
pub struct GreedyAgent {
    heuristic: Box<dyn Heuristic>,
    last_report: Option<SearchReport>,
}

impl GreedyAgent {
    pub fn new() -> Self {
        Self::with_heuristic(Box::new(WindowHeuristic))
    }

    pub fn with_heuristic(heuristic: Box<dyn Heuristic>) -> Self {
        GreedyAgent {
            heuristic,
            last_report: None,
        }
    }
}

impl Default for GreedyAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for GreedyAgent {
    fn select_action(&mut self, state: &GameState) -> Result<usize, SearchError> {
        let start = Instant::now();
        let side = state.current_player();

        let mut best: Option<(usize, i32)> = None;
        for col in state.legal_actions() {
            let Ok(next) = state.board().with_drop(col, side.to_cell()) else {
                continue;
            };
            let score = self.heuristic.evaluate(&next, side);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((col, score));
            }
        }

        let (column, score) = best.ok_or(SearchError::EmptySearchSpace)?;
        self.last_report = Some(SearchReport {
            column,
            elapsed: start.elapsed(),
            detail: SearchDetail::Heuristic { score },
        });
        Ok(column)
    }

    fn name(&self) -> &str {
        "Greedy"
    }

    fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Player};

    #[test]
    fn test_greedy_opens_in_center() {
        let mut agent = GreedyAgent::new();
        let state = GameState::initial(Player::Ai);
        assert_eq!(agent.select_action(&state).unwrap(), 3);
    }

    #[test]
    fn test_greedy_completes_four() {
        let board: Board = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            X X X . . . .
            O O O . . X .
            "
        .parse()
        .unwrap();
        let state = GameState::from_board(board, Player::Ai);
        let mut agent = GreedyAgent::new();
        assert_eq!(agent.select_action(&state).unwrap(), 3);
    }

    #[test]
    fn test_greedy_on_finished_game() {
        let board: Board = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            O O O O X X X
            "
        .parse()
        .unwrap();
        let state = GameState::from_board(board, Player::Human);
        let mut agent = GreedyAgent::new();
        assert_eq!(
            agent.select_action(&state),
            Err(SearchError::EmptySearchSpace)
        );
    }
}
