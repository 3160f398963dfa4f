use serde::{Deserialize, Serialize};

use super::board::{Cell, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Human,
    Ai,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Human => Player::Ai,
            Player::Ai => Player::Human,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Player::Human => Cell::Human,
            Player::Ai => Cell::Ai,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::Human => "Human",
            Player::Ai => "AI",
        }
    }

    /// The outcome in which this player has four in a row.
    pub fn winning_outcome(self) -> Outcome {
        match self {
            Player::Human => Outcome::HumanWin,
            Player::Ai => Outcome::AiWin,
        }
    }
}
