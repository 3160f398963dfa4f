//! Entry points used by the binaries: one-shot move functions, agent
//! construction from configuration, and an interactive game session.

use std::time::Duration;

use rand::Rng;

use crate::ai::{
    alpha_beta, Agent, GreedyAgent, MctsAgent, MctsSearch, MinimaxAgent, MinimaxSearch,
    RandomAgent, SearchBudget, SearchReport,
};
use crate::config::{AppConfig, FirstMover, OpponentKind, StrategyKind};
use crate::error::{MoveError, PlayError, SearchError};
use crate::game::{Board, Cell, GameState, Outcome, Player};

/// Move-selection strategy for [`choose_ai_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Alpha-beta to `depth` plies. A depth of 0 is searched as depth 1 so
    /// that a column always comes back.
    Minimax { depth: usize },
    Mcts { budget: SearchBudget },
}

/// Drop a human piece in `column`, returning the new board.
pub fn apply_human_move(board: &Board, column: usize) -> Result<Board, MoveError> {
    if board.outcome().is_terminal() {
        return Err(MoveError::GameOver);
    }
    board.with_drop(column, Cell::Human)
}

/// Pick a column for the AI on `board`.
///
/// `rng_seed` only matters for MCTS; `None` seeds from the OS.
pub fn choose_ai_move(
    board: &Board,
    strategy: &Strategy,
    rng_seed: Option<u64>,
) -> Result<usize, SearchError> {
    match *strategy {
        Strategy::Minimax { depth } => alpha_beta(board, depth, Player::Ai)?
            .column
            .ok_or(SearchError::EmptySearchSpace),
        Strategy::Mcts { budget } => {
            let root = GameState::from_board(*board, Player::Ai);
            let mut search = match rng_seed {
                Some(seed) => MctsSearch::with_seed(root, seed),
                None => MctsSearch::new(root),
            };
            search.search(budget);
            search.best_move().ok_or(SearchError::EmptySearchSpace)
        }
    }
}

/// Build the AI agent described by `config`.
pub fn build_agent(config: &AppConfig) -> Box<dyn Agent> {
    build_strategy_agent(config.game.strategy, config, config.game.seed)
}

/// Build the arena opponent described by `config`. Its seed is offset from
/// the AI's so seeded runs do not mirror each other.
pub fn build_opponent(config: &AppConfig) -> Box<dyn Agent> {
    let seed = config.game.seed.map(|s| s.wrapping_add(1));
    match config.arena.opponent {
        OpponentKind::Random => Box::new(match seed {
            Some(seed) => RandomAgent::with_seed(seed),
            None => RandomAgent::new(),
        }),
        OpponentKind::Greedy => Box::new(GreedyAgent::new()),
        OpponentKind::Minimax => build_strategy_agent(StrategyKind::Minimax, config, seed),
        OpponentKind::Mcts => build_strategy_agent(StrategyKind::Mcts, config, seed),
    }
}

fn build_strategy_agent(
    kind: StrategyKind,
    config: &AppConfig,
    seed: Option<u64>,
) -> Box<dyn Agent> {
    match kind {
        StrategyKind::Minimax => {
            let search = MinimaxSearch::new(config.minimax.depth)
                .center_first(config.minimax.center_first)
                .time_limit(config.minimax.time_limit());
            Box::new(MinimaxAgent::with_search(search))
        }
        StrategyKind::Mcts => {
            let budget = config
                .mcts
                .budget()
                .unwrap_or(SearchBudget::Time(Duration::from_secs(1)));
            let root = GameState::initial(Player::Human);
            let search = match seed {
                Some(seed) => MctsSearch::with_seed(root, seed),
                None => MctsSearch::new(root),
            }
            .exploration(config.mcts.exploration);
            Box::new(MctsAgent::with_search(search, budget).reuse_tree(config.mcts.reuse_tree))
        }
    }
}

/// Resolve who moves first, flipping a coin for [`FirstMover::Random`].
pub fn resolve_first_mover(first: FirstMover, rng: &mut impl Rng) -> Player {
    match first {
        FirstMover::Human => Player::Human,
        FirstMover::Ai => Player::Ai,
        FirstMover::Random => {
            if rng.random_bool(0.5) {
                Player::Human
            } else {
                Player::Ai
            }
        }
    }
}

/// A human-versus-AI game in progress.
pub struct Game {
    state: GameState,
    ai: Box<dyn Agent>,
    history: Vec<usize>,
}

impl Game {
    pub fn new(mut ai: Box<dyn Agent>, first: Player) -> Self {
        ai.reset();
        log::info!("new game: {} vs Human, {} moves first", ai.name(), first.name());
        Game {
            state: GameState::initial(first),
            ai,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn to_move(&self) -> Player {
        self.state.current_player()
    }

    /// Columns played so far, in order.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn ai_name(&self) -> &str {
        self.ai.name()
    }

    /// Statistics from the AI's last search.
    pub fn ai_report(&self) -> Option<&SearchReport> {
        self.ai.last_report()
    }

    /// Play the human's half-move. The state is unchanged on error.
    pub fn play_human(&mut self, column: usize) -> Result<Outcome, PlayError> {
        if self.state.is_terminal() {
            return Err(MoveError::GameOver.into());
        }
        if self.state.current_player() != Player::Human {
            return Err(PlayError::OutOfTurn(Player::Human.name()));
        }
        self.commit(column)
    }

    /// Let the AI choose and play its half-move. Returns the column played.
    pub fn play_ai(&mut self) -> Result<usize, PlayError> {
        if self.state.is_terminal() {
            return Err(MoveError::GameOver.into());
        }
        if self.state.current_player() != Player::Ai {
            return Err(PlayError::OutOfTurn(Player::Ai.name()));
        }

        let column = self.ai.select_action(&self.state)?;
        let legal = self.state.legal_actions();
        if !legal.contains(&column) {
            return Err(PlayError::IllegalChoice {
                agent: self.ai.name().to_string(),
                column,
                legal: legal.to_vec(),
            });
        }
        if let Some(report) = self.ai.last_report() {
            log::debug!("{}: {report}", self.ai.name());
        }
        self.commit(column)?;
        Ok(column)
    }

    fn commit(&mut self, column: usize) -> Result<Outcome, PlayError> {
        let next = self.state.apply_move(column)?;
        self.ai.observe_move(&self.state, column);
        self.state = next;
        self.history.push(column);

        let outcome = self.state.outcome();
        if outcome.is_terminal() {
            log::info!("game over after {} moves: {outcome:?}", self.history.len());
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(diagram: &str) -> Board {
        diagram.parse().unwrap()
    }

    #[test]
    fn test_apply_human_move() {
        let next = apply_human_move(&Board::new(), 2).unwrap();
        assert_eq!(next.get(0, 2), Cell::Human);
        assert_eq!(next.piece_count(), 1);
    }

    #[test]
    fn test_apply_human_move_rejects_bad_columns() {
        assert_eq!(
            apply_human_move(&Board::new(), 9),
            Err(MoveError::InvalidColumn { column: 9 })
        );
        let full_first = board(
            "
            X . . . . . .
            O . . . . . .
            X . . . . . .
            O . . . . . .
            X . . . . . .
            O . . . . . .
            ",
        );
        assert_eq!(
            apply_human_move(&full_first, 0),
            Err(MoveError::ColumnFull { column: 0 })
        );
    }

    #[test]
    fn test_apply_human_move_after_game_over() {
        let won = board(
            "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            O O O O X X X
            ",
        );
        assert_eq!(apply_human_move(&won, 6), Err(MoveError::GameOver));
    }

    fn horizontal_three_for_ai() -> Board {
        board(
            "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . X X X . . .
            . O O O . . .
            ",
        )
    }

    #[test]
    fn test_choose_ai_move_both_strategies_take_win() {
        let b = horizontal_three_for_ai();
        let minimax = choose_ai_move(&b, &Strategy::Minimax { depth: 3 }, None).unwrap();
        assert!(minimax == 0 || minimax == 4);

        let mcts = choose_ai_move(
            &b,
            &Strategy::Mcts {
                budget: SearchBudget::Iterations(3000),
            },
            Some(1),
        )
        .unwrap();
        assert!(mcts == 0 || mcts == 4);
    }

    #[test]
    fn test_minimax_depth_zero_searches_one_ply() {
        let b = horizontal_three_for_ai();
        let zero = choose_ai_move(&b, &Strategy::Minimax { depth: 0 }, None).unwrap();
        let one = choose_ai_move(&b, &Strategy::Minimax { depth: 1 }, None).unwrap();
        assert_eq!(zero, one);
        assert_eq!(zero, 0);
    }

    #[test]
    fn test_choose_ai_move_on_finished_board() {
        let won = board(
            "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            O O O O X X X
            ",
        );
        for strategy in [
            Strategy::Minimax { depth: 2 },
            Strategy::Mcts {
                budget: SearchBudget::Iterations(10),
            },
        ] {
            assert_eq!(
                choose_ai_move(&won, &strategy, Some(0)),
                Err(SearchError::EmptySearchSpace)
            );
        }
    }

    #[test]
    fn test_build_agent_follows_strategy() {
        let mut config = AppConfig::default();
        assert_eq!(build_agent(&config).name(), "Minimax");
        config.game.strategy = StrategyKind::Mcts;
        assert_eq!(build_agent(&config).name(), "MCTS");
    }

    #[test]
    fn test_build_opponent() {
        let mut config = AppConfig::default();
        assert_eq!(build_opponent(&config).name(), "Random");
        config.arena.opponent = OpponentKind::Greedy;
        assert_eq!(build_opponent(&config).name(), "Greedy");
    }

    #[test]
    fn test_resolve_first_mover() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_first_mover(FirstMover::Human, &mut rng), Player::Human);
        assert_eq!(resolve_first_mover(FirstMover::Ai, &mut rng), Player::Ai);

        let picks: Vec<Player> = (0..64)
            .map(|_| resolve_first_mover(FirstMover::Random, &mut rng))
            .collect();
        assert!(picks.contains(&Player::Human));
        assert!(picks.contains(&Player::Ai));
    }

    #[test]
    fn test_game_alternates_and_records_history() {
        let mut game = Game::new(Box::new(MinimaxAgent::new(2)), Player::Human);
        assert_eq!(game.play_human(3).unwrap(), Outcome::Ongoing);
        assert_eq!(game.to_move(), Player::Ai);

        let reply = game.play_ai().unwrap();
        assert_eq!(game.history(), &[3, reply]);
        assert_eq!(game.board().piece_count(), 2);
        assert!(game.ai_report().is_some());
    }

    #[test]
    fn test_game_rejects_out_of_turn() {
        let mut game = Game::new(Box::new(RandomAgent::with_seed(1)), Player::Ai);
        assert_eq!(
            game.play_human(0),
            Err(PlayError::OutOfTurn("Human"))
        );
        game.play_ai().unwrap();
        assert_eq!(game.play_ai(), Err(PlayError::OutOfTurn("AI")));
    }

    #[test]
    fn test_game_invalid_move_leaves_state() {
        let mut game = Game::new(Box::new(RandomAgent::with_seed(2)), Player::Human);
        let before = *game.state();
        assert!(matches!(
            game.play_human(7),
            Err(PlayError::Move(MoveError::InvalidColumn { column: 7 }))
        ));
        assert_eq!(*game.state(), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_game_keeps_mcts_tree_in_sync() {
        let agent = MctsAgent::with_seed(SearchBudget::Iterations(200), 3);
        let mut game = Game::new(Box::new(agent), Player::Human);

        while !game.is_over() {
            match game.to_move() {
                Player::Human => {
                    let column = game.state().legal_actions()[0];
                    game.play_human(column).unwrap();
                }
                Player::Ai => {
                    game.play_ai().unwrap();
                }
            }
        }
        assert!(game.outcome().is_terminal());
        assert_eq!(game.play_ai(), Err(PlayError::Move(MoveError::GameOver)));
    }
}
