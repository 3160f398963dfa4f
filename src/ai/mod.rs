mod agent;
mod greedy;
pub mod heuristic;
pub mod mcts;
pub mod minimax;
mod random;

pub use agent::{Agent, SearchDetail, SearchReport};
pub use greedy::GreedyAgent;
pub use heuristic::{score, Heuristic, WindowHeuristic};
pub use mcts::{MctsAgent, MctsSearch, SearchBudget, SearchStats};
pub use minimax::{alpha_beta, minimax_unpruned, MinimaxAgent, MinimaxSearch, SearchResult};
pub use random::RandomAgent;
