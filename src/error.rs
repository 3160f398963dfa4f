use std::path::PathBuf;

/// Rejected attempt to place a piece. The board is never touched when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {column} is out of range (expected 0..7)")]
    InvalidColumn { column: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("cannot drop an empty cell")]
    EmptyPiece,

    #[error("the game is already over")]
    GameOver,
}

/// Errors raised by the move-selection searches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search invoked on a board with no open columns")]
    EmptySearchSpace,
}

/// Errors raised when building a board from external data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("malformed board: {reason}")]
    Malformed { reason: String },
}

impl BoardError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        BoardError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while playing a game, either interactively or in the
/// arena.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    #[error("invalid move: {0}")]
    Move(#[from] MoveError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("agent '{agent}' selected illegal column {column} (legal: {legal:?})")]
    IllegalChoice {
        agent: String,
        column: usize,
        legal: Vec<usize>,
    },

    #[error("it is not the {0}'s turn")]
    OutOfTurn(&'static str),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::ColumnFull { column: 3 };
        assert_eq!(err.to_string(), "column 3 is full");
        let err = MoveError::InvalidColumn { column: 9 };
        assert_eq!(err.to_string(), "column 9 is out of range (expected 0..7)");
    }

    #[test]
    fn test_play_error_wraps_move_error() {
        let err: PlayError = MoveError::GameOver.into();
        assert_eq!(err.to_string(), "invalid move: the game is already over");
    }

    #[test]
    fn test_illegal_choice_display() {
        let err = PlayError::IllegalChoice {
            agent: "Random".to_string(),
            column: 5,
            legal: vec![0, 1, 2],
        };
        assert_eq!(
            err.to_string(),
            "agent 'Random' selected illegal column 5 (legal: [0, 1, 2])"
        );
    }

    #[test]
    fn test_out_of_turn_display() {
        assert_eq!(
            PlayError::OutOfTurn("AI").to_string(),
            "it is not the AI's turn"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("minimax.depth must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: minimax.depth must be >= 1"
        );
    }

    #[test]
    fn test_board_error_display() {
        let err = BoardError::malformed("expected 6 rows, found 5");
        assert_eq!(err.to_string(), "malformed board: expected 6 rows, found 5");
    }
}
