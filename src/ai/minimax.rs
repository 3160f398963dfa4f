use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::game::{Board, GameState, Outcome, Player, COLS};

use super::agent::{Agent, SearchDetail, SearchReport};
use super::heuristic::{Heuristic, WindowHeuristic};

/// Value of a board on which the searching side has four in a row.
pub const WIN_SCORE: i32 = 100_000;

/// Column ordering: center-first for better alpha-beta pruning.
const CENTER_FIRST: [usize; COLS] = [3, 2, 4, 1, 5, 0, 6];
const ASCENDING: [usize; COLS] = [0, 1, 2, 3, 4, 5, 6];

/// Best column found by a search and its minimax value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only for leaves (terminal or depth-exhausted boards).
    pub column: Option<usize>,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimaxStats {
    pub nodes: u64,
    pub elapsed: Duration,
    /// The deadline expired. The column is the best among the root children
    /// searched before it, or the first one if none finished.
    pub approximate: bool,
}

/// One tree walk. Holds everything that stays fixed during the recursion.
struct Walk<'a> {
    heuristic: &'a dyn Heuristic,
    side: Player,
    order: &'a [usize; COLS],
    prune: bool,
    root_depth: usize,
    deadline: Option<Instant>,
    nodes: u64,
    timed_out: bool,
}

impl Walk<'_> {
    fn leaf_value(&self, board: &Board) -> Option<i32> {
        match board.outcome() {
            Outcome::Ongoing => None,
            Outcome::Draw => Some(0),
            winner if winner == self.side.winning_outcome() => Some(WIN_SCORE),
            _ => Some(-WIN_SCORE),
        }
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: usize,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> SearchResult {
        self.nodes += 1;

        if let Some(value) = self.leaf_value(board) {
            return SearchResult {
                column: None,
                value,
            };
        }

        // The root is always expanded so that a column comes back.
        let expired = depth < self.root_depth
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if expired {
            self.timed_out = true;
        }
        if depth == 0 || expired {
            return SearchResult {
                column: None,
                value: self.heuristic.evaluate(board, self.side),
            };
        }

        let mover = if maximizing {
            self.side
        } else {
            self.side.other()
        };
        let mut best = SearchResult {
            column: None,
            value: if maximizing { i32::MIN } else { i32::MAX },
        };

        for &col in self.order {
            let Ok(child) = board.with_drop(col, mover.to_cell()) else {
                continue;
            };
            let value = self.minimax(&child, depth - 1, alpha, beta, !maximizing).value;

            // A root child cut short by the deadline only stands in when no
            // other column has been searched.
            if self.timed_out && depth == self.root_depth && best.column.is_some() {
                break;
            }

            if maximizing {
                if value > best.value {
                    best = SearchResult {
                        column: Some(col),
                        value,
                    };
                }
                if self.prune {
                    alpha = alpha.max(value);
                }
            } else {
                if value < best.value {
                    best = SearchResult {
                        column: Some(col),
                        value,
                    };
                }
                if self.prune {
                    beta = beta.min(value);
                }
            }

            if self.timed_out || (self.prune && alpha >= beta) {
                break;
            }
        }

        best
    }
}

/// Fixed-depth minimax search with alpha-beta pruning.
pub struct MinimaxSearch {
    depth: usize,
    center_first: bool,
    time_limit: Option<Duration>,
    heuristic: Box<dyn Heuristic>,
    stats: MinimaxStats,
}

impl MinimaxSearch {
    /// `depth` is clamped to at least 1 so the root always yields a column.
    pub fn new(depth: usize) -> Self {
        Self::with_heuristic(depth, Box::new(WindowHeuristic))
    }

    pub fn with_heuristic(depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        if depth == 0 {
            log::warn!("minimax depth 0 requested, searching depth 1");
        }
        MinimaxSearch {
            depth: depth.max(1),
            center_first: false,
            time_limit: None,
            heuristic,
            stats: MinimaxStats::default(),
        }
    }

    /// Try the center columns first. Changes which of several equally valued
    /// columns is returned, never the value.
    pub fn center_first(mut self, enabled: bool) -> Self {
        self.center_first = enabled;
        self
    }

    /// Stop descending once `limit` has elapsed; the result is then only an
    /// approximation.
    pub fn time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> MinimaxStats {
        self.stats
    }

    /// Best column for `side` to play on `board`.
    pub fn search(&mut self, board: &Board, side: Player) -> Result<SearchResult, SearchError> {
        self.run(board, side, true)
    }

    /// Same walk without pruning. Slower, and returns the same value as
    /// [`MinimaxSearch::search`].
    pub fn search_unpruned(
        &mut self,
        board: &Board,
        side: Player,
    ) -> Result<SearchResult, SearchError> {
        self.run(board, side, false)
    }

    fn run(
        &mut self,
        board: &Board,
        side: Player,
        prune: bool,
    ) -> Result<SearchResult, SearchError> {
        if board.legal_columns().is_empty() || board.outcome().is_terminal() {
            return Err(SearchError::EmptySearchSpace);
        }

        let start = Instant::now();
        let mut walk = Walk {
            heuristic: self.heuristic.as_ref(),
            side,
            order: if self.center_first {
                &CENTER_FIRST
            } else {
                &ASCENDING
            },
            prune,
            root_depth: self.depth,
            deadline: self.time_limit.map(|limit| start + limit),
            nodes: 0,
            timed_out: false,
        };
        let result = walk.minimax(board, self.depth, i32::MIN, i32::MAX, true);

        self.stats = MinimaxStats {
            nodes: walk.nodes,
            elapsed: start.elapsed(),
            approximate: walk.timed_out,
        };
        log::debug!(
            "minimax depth {} (pruning: {prune}): column {:?} value {} after {} nodes in {:?}",
            self.depth,
            result.column,
            result.value,
            self.stats.nodes,
            self.stats.elapsed
        );

        Ok(result)
    }
}

/// Alpha-beta search with the default heuristic.
pub fn alpha_beta(board: &Board, depth: usize, side: Player) -> Result<SearchResult, SearchError> {
    MinimaxSearch::new(depth).search(board, side)
}

/// Plain minimax with the default heuristic.
pub fn minimax_unpruned(
    board: &Board,
    depth: usize,
    side: Player,
) -> Result<SearchResult, SearchError> {
    MinimaxSearch::new(depth).search_unpruned(board, side)
}

/// Minimax agent; searches for whichever side is to move.
pub struct MinimaxAgent {
    search: MinimaxSearch,
    last_report: Option<SearchReport>,
}

impl MinimaxAgent {
    pub fn new(depth: usize) -> Self {
        Self::with_search(MinimaxSearch::new(depth))
    }

    pub fn with_search(search: MinimaxSearch) -> Self {
        MinimaxAgent {
            search,
            last_report: None,
        }
    }
}

impl Agent for MinimaxAgent {
    fn select_action(&mut self, state: &GameState) -> Result<usize, SearchError> {
        if state.is_terminal() {
            return Err(SearchError::EmptySearchSpace);
        }
        let result = self.search.search(state.board(), state.current_player())?;
        let column = result.column.ok_or(SearchError::EmptySearchSpace)?;
        let stats = self.search.stats();
        self.last_report = Some(SearchReport {
            column,
            elapsed: stats.elapsed,
            detail: SearchDetail::Minimax {
                value: result.value,
                nodes: stats.nodes,
                approximate: stats.approximate,
            },
        });
        Ok(column)
    }

    fn name(&self) -> &str {
        "Minimax"
    }

    fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}
