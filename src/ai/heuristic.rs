use crate::game::{windows, Board, Player, CENTER_COL, ROWS};

/// Points per own piece in the center column.
pub const CENTER_WEIGHT: i32 = 6;

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player) -> i32;
}

/// Default heuristic: center control plus a score for every 4-cell window.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHeuristic;

impl WindowHeuristic {
    fn score_window(own: usize, opp: usize, empty: usize) -> i32 {
        match (own, empty, opp) {
            (4, 0, 0) => 100,
            (3, 1, 0) => 5,
            (2, 2, 0) => 2,
            (0, 1, 3) => -40,
            _ => 0,
        }
    }
}

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> i32 {
        score(board, player)
    }
}

/// Static score of `board` for `player`; higher is better for `player`.
pub fn score(board: &Board, player: Player) -> i32 {
    let own_cell = player.to_cell();
    let opp_cell = player.other().to_cell();

    let center = (0..ROWS)
        .filter(|&row| board.get(row, CENTER_COL) == own_cell)
        .count() as i32;
    let mut total = center * CENTER_WEIGHT;

    for window in windows() {
        let mut own = 0;
        let mut opp = 0;
        let mut empty = 0;
        for (row, col) in window {
            match board.get(row, col) {
                c if c == own_cell => own += 1,
                c if c == opp_cell => opp += 1,
                _ => empty += 1,
            }
        }
        total += WindowHeuristic::score_window(own, opp, empty);
    }

    total
}
