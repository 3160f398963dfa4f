use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::mcts::DEFAULT_EXPLORATION;
use crate::ai::SearchBudget;
use crate::error::ConfigError;

/// Which search answers the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Minimax,
    Mcts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FirstMover {
    Human,
    Ai,
    /// Coin flip at the start of every game.
    Random,
}

/// Opponent the AI faces in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    Random,
    Greedy,
    Minimax,
    Mcts,
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
    pub arena: ArenaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub strategy: StrategyKind,
    pub first_mover: FirstMover,
    /// Seed for every random choice the AI makes. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            strategy: StrategyKind::Minimax,
            first_mover: FirstMover::Human,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimaxConfig {
    pub depth: usize,
    /// Explore columns from the center outward for earlier cutoffs.
    pub center_first: bool,
    /// Give up on deeper levels after this long and return the best move so far.
    pub time_limit_ms: Option<u64>,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig {
            depth: 5,
            center_first: false,
            time_limit_ms: None,
        }
    }
}

impl MinimaxConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    pub exploration: f64,
    /// Fixed iteration count; takes precedence over `time_limit_ms`.
    pub iterations: Option<u64>,
    pub time_limit_ms: Option<u64>,
    /// Keep the subtree of the played move between turns.
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            exploration: DEFAULT_EXPLORATION,
            iterations: None,
            time_limit_ms: Some(1000),
            reuse_tree: true,
        }
    }
}

impl MctsConfig {
    /// The budget a search gets per move, `None` if neither limit is set.
    pub fn budget(&self) -> Option<SearchBudget> {
        match (self.iterations, self.time_limit_ms) {
            (Some(iterations), _) => Some(SearchBudget::Iterations(iterations)),
            (None, Some(ms)) => Some(SearchBudget::Time(Duration::from_millis(ms))),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub games: usize,
    pub opponent: OpponentKind,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            games: 50,
            opponent: OpponentKind::Random,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimax.depth == 0 {
            return Err(ConfigError::Validation(
                "minimax.depth must be >= 1".into(),
            ));
        }
        if self.minimax.time_limit_ms == Some(0) {
            return Err(ConfigError::Validation(
                "minimax.time_limit_ms must be > 0".into(),
            ));
        }

        if !self.mcts.exploration.is_finite() || self.mcts.exploration <= 0.0 {
            return Err(ConfigError::Validation(
                "mcts.exploration must be a finite value > 0".into(),
            ));
        }
        if self.mcts.iterations == Some(0) {
            return Err(ConfigError::Validation(
                "mcts.iterations must be >= 1".into(),
            ));
        }
        if self.mcts.time_limit_ms == Some(0) {
            return Err(ConfigError::Validation(
                "mcts.time_limit_ms must be > 0".into(),
            ));
        }
        if self.mcts.budget().is_none() {
            return Err(ConfigError::Validation(
                "mcts needs either iterations or time_limit_ms".into(),
            ));
        }

        if self.arena.games == 0 {
            return Err(ConfigError::Validation(
                "arena.games must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values. Printed by
    /// `--print-config`.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
