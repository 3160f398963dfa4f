use std::time::{Duration, Instant};

use crate::ai::Agent;
use crate::error::PlayError;
use crate::game::{GameState, Outcome, Player};

/// Everything the arena keeps about one finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub first: Player,
    pub outcome: Outcome,
    pub moves: Vec<usize>,
    /// Wall time of each of the AI's `select_action` calls.
    pub ai_move_times: Vec<Duration>,
}

impl GameRecord {
    pub fn length(&self) -> usize {
        self.moves.len()
    }
}

/// Play one game. `ai` plays [`Player::Ai`] and `opponent` plays
/// [`Player::Human`]; both observe every move.
pub fn play_game(
    ai: &mut dyn Agent,
    opponent: &mut dyn Agent,
    first: Player,
) -> Result<GameRecord, PlayError> {
    ai.reset();
    opponent.reset();

    let mut state = GameState::initial(first);
    let mut moves = Vec::new();
    let mut ai_move_times = Vec::new();

    while !state.is_terminal() {
        let agent: &mut dyn Agent = match state.current_player() {
            Player::Ai => &mut *ai,
            Player::Human => &mut *opponent,
        };

        let start = Instant::now();
        let column = agent.select_action(&state)?;
        let elapsed = start.elapsed();

        let legal = state.legal_actions();
        if !legal.contains(&column) {
            return Err(PlayError::IllegalChoice {
                agent: agent.name().to_string(),
                column,
                legal: legal.to_vec(),
            });
        }
        if state.current_player() == Player::Ai {
            ai_move_times.push(elapsed);
        }

        ai.observe_move(&state, column);
        opponent.observe_move(&state, column);
        state.apply_move_mut(column)?;
        moves.push(column);
    }

    Ok(GameRecord {
        first,
        outcome: state.outcome(),
        moves,
        ai_move_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GreedyAgent, RandomAgent};
    use crate::error::SearchError;

    /// Always answers column 0, full or not.
    struct StubbornAgent;

    impl Agent for StubbornAgent {
        fn select_action(&mut self, _state: &GameState) -> Result<usize, SearchError> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "Stubborn"
        }
    }

    #[test]
    fn test_play_game_finishes() {
        let mut ai = RandomAgent::with_seed(1);
        let mut opponent = RandomAgent::with_seed(2);
        let record = play_game(&mut ai, &mut opponent, Player::Ai).unwrap();

        assert!(record.outcome.is_terminal());
        assert!(record.length() >= 7);
        assert!(record.length() <= 42);
        // AI moved first, so it made the odd-numbered moves.
        assert_eq!(record.ai_move_times.len(), record.length().div_ceil(2));
    }

    #[test]
    fn test_moves_replay_to_outcome() {
        let mut ai = GreedyAgent::new();
        let mut opponent = RandomAgent::with_seed(3);
        let record = play_game(&mut ai, &mut opponent, Player::Human).unwrap();

        let mut state = GameState::initial(Player::Human);
        for &column in &record.moves {
            state = state.apply_move(column).unwrap();
        }
        assert_eq!(state.outcome(), record.outcome);
        assert_eq!(record.ai_move_times.len(), record.length() / 2);
    }

    #[test]
    fn test_illegal_choice_is_reported() {
        let mut ai = StubbornAgent;
        let mut opponent = StubbornAgent;
        let err = play_game(&mut ai, &mut opponent, Player::Human).unwrap_err();
        // Alternating pieces fill column 0 with no winner; the seventh pick
        // is illegal.
        assert!(matches!(
            err,
            PlayError::IllegalChoice { column: 0, .. }
        ));
    }
}
