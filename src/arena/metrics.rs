use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::game::{Outcome, Player};

use super::episode::GameRecord;

/// Running totals over arena games, from the AI's point of view.
#[derive(Debug, Clone, Default)]
pub struct ArenaMetrics {
    games: usize,
    ai_wins: usize,
    opponent_wins: usize,
    draws: usize,
    /// Games the AI opened, and how many of those it won.
    ai_first_games: usize,
    ai_first_wins: usize,
    total_moves: usize,
    ai_moves: usize,
    ai_time: Duration,
    max_ai_move: Duration,
}

impl ArenaMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, record: &GameRecord) {
        self.games += 1;
        let ai_first = record.first == Player::Ai;
        if ai_first {
            self.ai_first_games += 1;
        }
        match record.outcome {
            Outcome::AiWin => {
                self.ai_wins += 1;
                if ai_first {
                    self.ai_first_wins += 1;
                }
            }
            Outcome::HumanWin => self.opponent_wins += 1,
            Outcome::Draw | Outcome::Ongoing => self.draws += 1,
        }
        self.total_moves += record.length();
        self.ai_moves += record.ai_move_times.len();
        for &time in &record.ai_move_times {
            self.ai_time += time;
            self.max_ai_move = self.max_ai_move.max(time);
        }
    }

    pub fn games(&self) -> usize {
        self.games
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.ai_wins, self.games)
    }

    pub fn draw_rate(&self) -> f64 {
        ratio(self.draws, self.games)
    }

    pub fn loss_rate(&self) -> f64 {
        ratio(self.opponent_wins, self.games)
    }

    /// Win rate over the games the AI moved first in.
    pub fn win_rate_moving_first(&self) -> f64 {
        ratio(self.ai_first_wins, self.ai_first_games)
    }

    /// Win rate over the games the opponent moved first in.
    pub fn win_rate_moving_second(&self) -> f64 {
        ratio(
            self.ai_wins - self.ai_first_wins,
            self.games - self.ai_first_games,
        )
    }

    pub fn avg_game_length(&self) -> f64 {
        ratio(self.total_moves, self.games)
    }

    /// Mean wall time of an AI move.
    pub fn mean_ai_move(&self) -> Duration {
        if self.ai_moves == 0 {
            return Duration::ZERO;
        }
        self.ai_time / self.ai_moves as u32
    }

    pub fn report(&self, ai: &str, opponent: &str) -> ArenaReport {
        ArenaReport {
            ai: ai.to_string(),
            opponent: opponent.to_string(),
            games: self.games,
            ai_wins: self.ai_wins,
            opponent_wins: self.opponent_wins,
            draws: self.draws,
            win_rate: self.win_rate(),
            draw_rate: self.draw_rate(),
            loss_rate: self.loss_rate(),
            win_rate_moving_first: self.win_rate_moving_first(),
            win_rate_moving_second: self.win_rate_moving_second(),
            avg_game_length: self.avg_game_length(),
            mean_ai_move_ms: self.mean_ai_move().as_secs_f64() * 1000.0,
            max_ai_move_ms: self.max_ai_move.as_secs_f64() * 1000.0,
        }
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Final arena summary, printable as text or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaReport {
    pub ai: String,
    pub opponent: String,
    pub games: usize,
    pub ai_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub win_rate_moving_first: f64,
    pub win_rate_moving_second: f64,
    pub avg_game_length: f64,
    pub mean_ai_move_ms: f64,
    pub max_ai_move_ms: f64,
}

impl fmt::Display for ArenaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {} over {} games", self.ai, self.opponent, self.games)?;
        writeln!(
            f,
            "  wins {} ({:.1}%) | draws {} ({:.1}%) | losses {} ({:.1}%)",
            self.ai_wins,
            self.win_rate * 100.0,
            self.draws,
            self.draw_rate * 100.0,
            self.opponent_wins,
            self.loss_rate * 100.0,
        )?;
        writeln!(
            f,
            "  win rate moving first {:.1}%, moving second {:.1}%",
            self.win_rate_moving_first * 100.0,
            self.win_rate_moving_second * 100.0,
        )?;
        writeln!(f, "  average game length: {:.1} moves", self.avg_game_length)?;
        write!(
            f,
            "  AI move time: mean {:.2} ms, max {:.2} ms",
            self.mean_ai_move_ms, self.max_ai_move_ms
        )
    }
}
