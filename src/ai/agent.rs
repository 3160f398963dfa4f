use std::fmt;
use std::time::Duration;

use crate::error::SearchError;
use crate::game::GameState;

/// Summary of the most recent search an agent ran, for logs and the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub column: usize,
    pub elapsed: Duration,
    pub detail: SearchDetail,
}

/// Strategy-specific statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchDetail {
    Minimax {
        value: i32,
        nodes: u64,
        /// The deadline cut the search short.
        approximate: bool,
    },
    Mcts {
        iterations: u64,
        nodes: usize,
        /// Visits of the chosen root child.
        visits: u32,
        /// Mean reward of the chosen root child, in [0, 1].
        win_rate: f64,
    },
    Heuristic {
        score: i32,
    },
    Random,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.elapsed.as_secs_f64() * 1000.0;
        match &self.detail {
            SearchDetail::Minimax {
                value,
                nodes,
                approximate,
            } => write!(
                f,
                "column {} | value {value}{} | {nodes} nodes in {ms:.1} ms",
                self.column + 1,
                if *approximate { " (approx)" } else { "" },
            ),
            SearchDetail::Mcts {
                iterations,
                nodes,
                visits,
                win_rate,
            } => write!(
                f,
                "column {} | {iterations} rollouts in {ms:.1} ms | {visits} visits, {:.1}% | tree {nodes} nodes",
                self.column + 1,
                win_rate * 100.0,
            ),
            SearchDetail::Heuristic { score } => {
                write!(f, "column {} | score {score}", self.column + 1)
            }
            SearchDetail::Random => write!(f, "column {} | random", self.column + 1),
        }
    }
}

/// Universal interface for every move-selection strategy.
pub trait Agent {
    /// Select a column for the side to move in `state`.
    ///
    /// Fails with [`SearchError::EmptySearchSpace`] when the game is over or
    /// no column is open.
    fn select_action(&mut self, state: &GameState) -> Result<usize, SearchError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Called after `column` has been played from `state`, by either side.
    fn observe_move(&mut self, _state: &GameState, _column: usize) {}

    /// Drop anything carried over from previous moves.
    fn reset(&mut self) {}

    /// Statistics for the last call to `select_action`.
    fn last_report(&self) -> Option<&SearchReport> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimax_report_display() {
        let report = SearchReport {
            column: 3,
            elapsed: Duration::from_millis(12),
            detail: SearchDetail::Minimax {
                value: 42,
                nodes: 1000,
                approximate: false,
            },
        };
        assert_eq!(
            report.to_string(),
            "column 4 | value 42 | 1000 nodes in 12.0 ms"
        );
    }

    #[test]
    fn test_random_report_display() {
        let report = SearchReport {
            column: 0,
            elapsed: Duration::ZERO,
            detail: SearchDetail::Random,
        };
        assert_eq!(report.to_string(), "column 1 | random");
    }
}
