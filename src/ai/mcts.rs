//! Monte Carlo Tree Search with UCB1 selection and uniformly random rollouts.
//!
//! The tree lives in a flat arena. Every node stores its parent's index for
//! backpropagation and one optional child index per column.
//!
//! Reward convention: a node's `reward` accumulates results from the point of
//! view of the player who made the move *into* that node, 1 for a win, 0 for
//! a loss and 0.5 for a draw. A parent choosing among its children therefore
//! maximizes its own winning chances. The value is complemented (1 - r) at
//! every level on the way up.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::error::{MoveError, SearchError};
use crate::game::{GameState, Outcome, Player, COLS};

use super::agent::{Agent, SearchDetail, SearchReport};

/// Canonical UCB1 exploration constant.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

const ROOT: usize = 0;

/// How long a call to [`MctsSearch::search`] may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    Iterations(u64),
    Time(Duration),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: u64,
    pub elapsed: Duration,
    /// Nodes in the tree once the search finished.
    pub nodes: usize,
}

/// Visit statistics for one root child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub column: usize,
    pub visits: u32,
    /// Mean reward for the side to move at the root.
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct MctsNode {
    state: GameState,
    /// Column played from the parent to reach this node.
    mv: Option<usize>,
    parent: Option<usize>,
    /// Child node indices by column; `None` for illegal columns.
    children: [Option<usize>; COLS],
    is_expanded: bool,
    visits: u32,
    reward: f64,
}

impl MctsNode {
    fn new(state: GameState, mv: Option<usize>, parent: Option<usize>) -> Self {
        MctsNode {
            state,
            mv,
            parent,
            children: [None; COLS],
            is_expanded: false,
            visits: 0,
            reward: 0.0,
        }
    }

    fn child_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.children.iter().flatten().copied()
    }

    /// UCB1 score as seen from the parent; unvisited nodes are infinitely
    /// attractive.
    fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.reward / visits + exploration * ((parent_visits as f64).ln() / visits).sqrt()
    }
}

struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    fn new(root_state: GameState) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(MctsNode::new(root_state, None, None));
        MctsTree { nodes }
    }

    /// Create one child per legal column of `node_idx`.
    fn expand(&mut self, node_idx: usize) {
        let parent_state = self.nodes[node_idx].state;

        let mut children = [None; COLS];
        for column in parent_state.legal_actions() {
            let Ok(child_state) = parent_state.apply_move(column) else {
                continue;
            };
            children[column] = Some(self.nodes.len());
            self.nodes
                .push(MctsNode::new(child_state, Some(column), Some(node_idx)));
        }

        let node = &mut self.nodes[node_idx];
        node.children = children;
        node.is_expanded = true;
    }

    /// Add `reward` (for the player to move at `leaf`) to every node from
    /// `leaf` up to the root.
    fn backpropagate(&mut self, leaf: usize, reward: f64) {
        let mut value = 1.0 - reward;
        let mut current = Some(leaf);
        while let Some(idx) = current {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            node.reward += value;
            value = 1.0 - value;
            current = node.parent;
        }
    }

    /// Keep only the subtree under `new_root`, renumbered so that it starts
    /// at index 0.
    fn reroot(&mut self, new_root: usize) {
        let mut order = vec![new_root];
        let mut remap = vec![usize::MAX; self.nodes.len()];
        remap[new_root] = ROOT;

        let mut next = 0;
        while next < order.len() {
            let old = order[next];
            for child in self.nodes[old].child_indices() {
                remap[child] = order.len();
                order.push(child);
            }
            next += 1;
        }

        let nodes = order
            .iter()
            .map(|&old| {
                let mut node = self.nodes[old];
                node.parent = if old == new_root {
                    None
                } else {
                    node.parent.map(|p| remap[p])
                };
                for child in node.children.iter_mut().flatten() {
                    *child = remap[*child];
                }
                node
            })
            .collect();
        self.nodes = nodes;
    }
}

/// A persistent MCTS tree plus its random source.
pub struct MctsSearch {
    tree: MctsTree,
    exploration: f64,
    rng: StdRng,
    stats: SearchStats,
}

impl MctsSearch {
    pub fn new(root: GameState) -> Self {
        Self::with_rng(root, StdRng::from_os_rng())
    }

    /// Reproducible search: rollouts and tie-breaks are driven by `seed`.
    pub fn with_seed(root: GameState, seed: u64) -> Self {
        Self::with_rng(root, StdRng::seed_from_u64(seed))
    }

    fn with_rng(root: GameState, rng: StdRng) -> Self {
        MctsSearch {
            tree: MctsTree::new(root),
            exploration: DEFAULT_EXPLORATION,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn root_state(&self) -> &GameState {
        &self.tree.nodes[ROOT].state
    }

    pub fn root_visits(&self) -> u32 {
        self.tree.nodes[ROOT].visits
    }

    pub fn node_count(&self) -> usize {
        self.tree.nodes.len()
    }

    /// Statistics of the last call to [`MctsSearch::search`].
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Discard the tree and start over from `state`.
    pub fn reset(&mut self, state: GameState) {
        self.tree = MctsTree::new(state);
        self.stats = SearchStats::default();
    }

    /// Grow the tree within `budget`.
    ///
    /// A non-terminal root always gets at least one iteration so that a move
    /// is available afterwards. A terminal root is left untouched.
    pub fn search(&mut self, budget: SearchBudget) -> SearchStats {
        let start = Instant::now();
        let mut iterations = 0;

        if !self.root_state().is_terminal() {
            loop {
                self.iterate();
                iterations += 1;
                let done = match budget {
                    SearchBudget::Iterations(limit) => iterations >= limit,
                    SearchBudget::Time(limit) => start.elapsed() >= limit,
                };
                if done {
                    break;
                }
            }
        }

        self.stats = SearchStats {
            iterations,
            elapsed: start.elapsed(),
            nodes: self.node_count(),
        };
        log::debug!(
            "mcts: {} iterations in {:?}, root visits {}, tree size {}",
            self.stats.iterations,
            self.stats.elapsed,
            self.root_visits(),
            self.stats.nodes
        );
        self.stats
    }

    /// Most visited root child; ties are broken uniformly at random. `None`
    /// when the root is terminal or has not been searched yet.
    pub fn best_move(&mut self) -> Option<usize> {
        let root = &self.tree.nodes[ROOT];
        if root.state.is_terminal() {
            return None;
        }

        let most_visits = root
            .child_indices()
            .map(|idx| self.tree.nodes[idx].visits)
            .max()?;
        let candidates: ArrayVec<usize, COLS> = root
            .child_indices()
            .filter(|&idx| self.tree.nodes[idx].visits == most_visits)
            .filter_map(|idx| self.tree.nodes[idx].mv)
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Per-column statistics of the root's children, in column order.
    pub fn child_stats(&self) -> Vec<ChildStats> {
        let root = &self.tree.nodes[ROOT];
        root.child_indices()
            .filter_map(|idx| {
                let child = &self.tree.nodes[idx];
                let column = child.mv?;
                let win_rate = if child.visits == 0 {
                    0.0
                } else {
                    child.reward / child.visits as f64
                };
                Some(ChildStats {
                    column,
                    visits: child.visits,
                    win_rate,
                })
            })
            .collect()
    }

    /// Play `column` from the root, keeping the statistics gathered for the
    /// resulting position and discarding its siblings.
    pub fn advance(&mut self, column: usize) -> Result<(), MoveError> {
        let next_state = self.root_state().apply_move(column)?;
        match self.tree.nodes[ROOT].children.get(column).copied().flatten() {
            Some(child) => self.tree.reroot(child),
            None => {
                log::debug!("mcts: column {column} not in tree, starting a fresh root");
                self.tree = MctsTree::new(next_state);
            }
        }
        Ok(())
    }

    /// One selection / expansion / rollout / backpropagation pass.
    fn iterate(&mut self) {
        let leaf = self.select();
        let reward = self.rollout(leaf);
        self.tree.backpropagate(leaf, reward);
    }

    fn select(&mut self) -> usize {
        let mut current = ROOT;

        while self.tree.nodes[current].is_expanded {
            let Some(child) = self.select_child(current) else {
                break;
            };
            current = child;
            if self.tree.nodes[child].visits == 0 {
                return child;
            }
        }

        let node = &self.tree.nodes[current];
        if !node.is_expanded && !node.state.is_terminal() {
            self.tree.expand(current);
            let children: ArrayVec<usize, COLS> =
                self.tree.nodes[current].child_indices().collect();
            if let Some(&child) = children.choose(&mut self.rng) {
                current = child;
            }
        }

        current
    }

    /// Child of `node_idx` with the highest UCB1 score, ties at random.
    fn select_child(&mut self, node_idx: usize) -> Option<usize> {
        let node = &self.tree.nodes[node_idx];
        let scores: ArrayVec<(usize, f64), COLS> = node
            .child_indices()
            .map(|idx| {
                let score = self.tree.nodes[idx].ucb1(node.visits, self.exploration);
                (idx, score)
            })
            .collect();

        let best = scores
            .iter()
            .map(|&(_, score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: ArrayVec<usize, COLS> = scores
            .iter()
            .filter(|&&(_, score)| score == best)
            .map(|&(idx, _)| idx)
            .collect();
        ties.choose(&mut self.rng).copied()
    }

    /// Play random moves from `node_idx` to the end of the game. Returns the
    /// reward for the player to move at `node_idx`.
    fn rollout(&mut self, node_idx: usize) -> f64 {
        let mut state = self.tree.nodes[node_idx].state;
        let mover = state.current_player();

        while !state.is_terminal() {
            let legal = state.legal_actions();
            let Some(&column) = legal.choose(&mut self.rng) else {
                break;
            };
            if state.apply_move_mut(column).is_err() {
                break;
            }
        }

        reward_for(state.outcome(), mover)
    }
}

fn reward_for(outcome: Outcome, player: Player) -> f64 {
    match outcome {
        Outcome::Draw | Outcome::Ongoing => 0.5,
        winner if winner == player.winning_outcome() => 1.0,
        _ => 0.0,
    }
}

/// MCTS agent. Optionally keeps its tree between moves.
pub struct MctsAgent {
    search: MctsSearch,
    budget: SearchBudget,
    reuse_tree: bool,
    last_report: Option<SearchReport>,
}

impl MctsAgent {
    pub fn new(budget: SearchBudget) -> Self {
        Self::with_search(
            MctsSearch::new(GameState::initial(Player::Human)),
            budget,
        )
    }

    pub fn with_seed(budget: SearchBudget, seed: u64) -> Self {
        Self::with_search(
            MctsSearch::with_seed(GameState::initial(Player::Human), seed),
            budget,
        )
    }

    pub fn with_search(search: MctsSearch, budget: SearchBudget) -> Self {
        MctsAgent {
            search,
            budget,
            reuse_tree: true,
            last_report: None,
        }
    }

    pub fn reuse_tree(mut self, enabled: bool) -> Self {
        self.reuse_tree = enabled;
        self
    }

    pub fn search(&self) -> &MctsSearch {
        &self.search
    }
}

impl Agent for MctsAgent {
    fn select_action(&mut self, state: &GameState) -> Result<usize, SearchError> {
        if state.legal_actions().is_empty() {
            return Err(SearchError::EmptySearchSpace);
        }
        if !self.reuse_tree || self.search.root_state() != state {
            self.search.reset(*state);
        }

        let stats = self.search.search(self.budget);
        let column = self
            .search
            .best_move()
            .ok_or(SearchError::EmptySearchSpace)?;

        let chosen = self
            .search
            .child_stats()
            .into_iter()
            .find(|child| child.column == column);
        self.last_report = Some(SearchReport {
            column,
            elapsed: stats.elapsed,
            detail: SearchDetail::Mcts {
                iterations: stats.iterations,
                nodes: stats.nodes,
                visits: chosen.map_or(0, |c| c.visits),
                win_rate: chosen.map_or(0.0, |c| c.win_rate),
            },
        });
        Ok(column)
    }

    fn name(&self) -> &str {
        "MCTS"
    }

    fn observe_move(&mut self, state: &GameState, column: usize) {
        if self.reuse_tree && self.search.root_state() == state {
            if let Err(err) = self.search.advance(column) {
                log::warn!("mcts: could not follow column {column}: {err}");
            }
        }
    }

    fn reset(&mut self) {
        self.search.reset(GameState::initial(Player::Human));
        self.last_report = None;
    }

    fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}
