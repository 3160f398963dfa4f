//! Automated games between two agents, with per-move timing.

pub mod episode;
pub mod metrics;

pub use episode::{play_game, GameRecord};
pub use metrics::{ArenaMetrics, ArenaReport};

use crate::ai::Agent;
use crate::error::PlayError;
use crate::game::Player;

/// Play `games` games, alternating the first mover starting with the AI, and
/// summarize them.
pub fn run_arena(
    ai: &mut dyn Agent,
    opponent: &mut dyn Agent,
    games: usize,
) -> Result<ArenaReport, PlayError> {
    let mut metrics = ArenaMetrics::new();

    for game in 0..games {
        let first = if game % 2 == 0 { Player::Ai } else { Player::Human };
        let record = play_game(ai, opponent, first)?;
        log::info!(
            "game {}/{games}: {:?} in {} moves ({} first)",
            game + 1,
            record.outcome,
            record.length(),
            first.name()
        );
        metrics.record_game(&record);
    }

    Ok(metrics.report(ai.name(), opponent.name()))
}
