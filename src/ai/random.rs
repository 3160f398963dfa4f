use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::error::SearchError;
use crate::game::GameState;

use super::agent::{Agent, SearchDetail, SearchReport};

/// An agent that selects uniformly at random from legal columns.
pub struct RandomAgent {
    rng: StdRng,
    last_report: Option<SearchReport>,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        RandomAgent {
            rng,
            last_report: None,
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, state: &GameState) -> Result<usize, SearchError> {
        let actions = state.legal_actions();
        let &column = actions
            .choose(&mut self.rng)
            .ok_or(SearchError::EmptySearchSpace)?;
        self.last_report = Some(SearchReport {
            column,
            elapsed: Default::default(),
            detail: SearchDetail::Random,
        });
        Ok(column)
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}
