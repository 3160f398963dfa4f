//! # Connect Four Search
//!
//! Connect Four on the standard 6x7 board with two computer players: a
//! depth-limited minimax search with alpha-beta pruning over a window
//! heuristic, and Monte Carlo Tree Search with UCB1 selection and random
//! rollouts.
//!
//! ## Modules
//!
//! - [`game`] : Board, pieces, outcomes and the side-to-move state
//! - [`ai`] : Agent trait, heuristic, minimax, MCTS, greedy and random agents
//! - [`engine`] : One-shot move functions and the human-vs-AI game session
//! - [`arena`] : Automated matches with win rates and move timing
//! - [`config`] : TOML configuration loading and validation
//! - [`error`] : Structured error types

pub mod ai;
pub mod arena;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
