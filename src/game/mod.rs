//! Core Connect Four game logic: board representation, player types, and game
//! state with immutable transitions.

mod board;
mod player;
mod state;

pub use board::{windows, Board, Cell, LegalColumns, Outcome, CENTER_COL, COLS, ROWS};
pub use player::Player;
pub use state::GameState;

pub use crate::error::{BoardError, MoveError};
