//! Monte Carlo Tree Search over match decisions.
//!
//! One `search` call serves one real decision: it builds a fresh tree
//! rooted at the current candidate set (no reuse across decisions), runs
//! up to `simulations` select/expand/rollout/backpropagate passes on
//! forked cursors, and commits the most-visited root action: the robust
//! child, not the highest mean.
//!
//! Nodes live in a flat arena indexed by `usize`; a node holds its parent
//! index and `(action, child)` pairs instead of pointers, so the whole
//! tree is dropped in one deallocation when the decision commits.
//!
//! Value sums are stored from the searching player's perspective. Phases
//! do not strictly alternate between players, so UCB exploitation flips
//! sign by the *deciding* player at each node rather than by depth.
//!
//! Replays are open loop: stochastic effects (energy grants, fetch
//! shuffles) can make a revisited path diverge from its recorded action
//! indices. A stored index beyond the live candidate count abandons the
//! descent and rolls out from wherever the simulation got to, rather than
//! corrupting statistics.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::decision::{self, ActionSelector};
use crate::game_loop::{DecisionRequest, MatchCursor, MatchEvent};
use crate::game_state::Outcome;
use crate::ids::PlayerId;
use crate::snapshot;

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    /// Simulation budget per decision.
    pub simulations: u32,
    /// Rollout cutoff, counted in phase-decisions (not turns).
    pub rollout_depth: u32,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Optional wall-clock budget; exceeding it truncates the search and
    /// commits on whatever statistics exist.
    pub time_limit: Option<Duration>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 100,
            rollout_depth: 10,
            exploration: std::f64::consts::SQRT_2,
            time_limit: None,
        }
    }
}

/// One node in the search arena.
#[derive(Debug, Clone)]
struct SearchNode {
    /// Parent index; None only for the root.
    parent: Option<usize>,
    /// Action-index to child-node-index links, in expansion order.
    children: Vec<(usize, usize)>,
    visits: u32,
    /// Cumulative evaluation, from the searching player's perspective.
    value_sum: f64,
    /// Candidate indices not yet expanded into children.
    untried: Vec<usize>,
    /// The player deciding at this node's candidate set.
    to_move: PlayerId,
    /// Evaluation cached when this node's action ended the match.
    terminal_value: Option<f64>,
}

impl SearchNode {
    fn new(parent: Option<usize>, candidates: usize, to_move: PlayerId) -> Self {
        Self {
            parent,
            children: Vec::new(),
            visits: 0,
            value_sum: 0.0,
            untried: (0..candidates).collect(),
            to_move,
            terminal_value: None,
        }
    }

    fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }
}

/// UCB1 with the unvisited-child rule: a zero-visit child scores infinite,
/// so every action is tried once before any exploitation.
fn ucb1(exploit: f64, child_visits: u32, parent_visits: u32, exploration: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }
    let parent_visits = parent_visits.max(1) as f64;
    exploit + exploration * (parent_visits.ln() / child_visits as f64).sqrt()
}

/// Committed result of one search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Candidate index to play.
    pub chosen: usize,
    /// Simulations actually completed.
    pub simulations: u32,
    /// True when the wall-clock budget cut the search short.
    pub truncated: bool,
    /// Root children as (action index, visit count), in expansion order.
    pub root_visits: Vec<(usize, u32)>,
}

fn terminal_value(outcome: Outcome, searcher: PlayerId) -> f64 {
    match outcome {
        Outcome::Winner(winner) if winner == searcher => 1.0,
        Outcome::Winner(_) => -1.0,
        Outcome::Draw | Outcome::InProgress => 0.0,
    }
}

/// Result of replaying one recorded action on a forked cursor.
enum Step {
    /// Next decision reached: candidate count and deciding player.
    Decision(usize, PlayerId),
    Finished(Outcome),
    /// Open-loop divergence: the recorded index no longer fits.
    Diverged,
}

fn step(sim: &mut MatchCursor, action: usize, rng: &mut impl Rng) -> Step {
    if sim.resume(action, rng).is_err() {
        return Step::Diverged;
    }
    match sim.advance(rng) {
        MatchEvent::Finished(outcome) => Step::Finished(outcome),
        MatchEvent::Decision(request) => {
            Step::Decision(request.candidates.len(), request.player)
        }
    }
}

/// Random-policy playout for both players until a terminal signal or the
/// depth cutoff, evaluated from the searcher's perspective: exactly one of
/// {-1, 0, +1} on terminal, the normalized heuristic inside [-1, 1] at the
/// cutoff.
fn rollout(
    sim: &mut MatchCursor,
    searcher: PlayerId,
    depth_limit: u32,
    rng: &mut impl Rng,
) -> f64 {
    let mut decisions = 0;
    loop {
        match sim.advance(rng) {
            MatchEvent::Finished(outcome) => return terminal_value(outcome, searcher),
            MatchEvent::Decision(request) => {
                if decisions >= depth_limit {
                    return decision::normalized_score(sim.state(), searcher);
                }
                let index = rng.random_range(0..request.candidates.len());
                if sim.resume(index, rng).is_err() {
                    return decision::normalized_score(sim.state(), searcher);
                }
                decisions += 1;
            }
        }
    }
}

/// Runs the search and returns the report plus the arena (for invariant
/// checks in tests).
fn run(
    cursor: &MatchCursor,
    request: &DecisionRequest,
    config: &MctsConfig,
    rng: &mut impl Rng,
) -> (SearchReport, Vec<SearchNode>) {
    let searcher = request.player;
    let candidate_count = request.candidates.len();
    let mut arena = vec![SearchNode::new(None, candidate_count, searcher)];
    let deadline = config.time_limit.map(|limit| Instant::now() + limit);

    let mut completed = 0;
    let mut truncated = false;
    for _ in 0..config.simulations {
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            // Budget exceeded: non-fatal, commit on partial statistics.
            truncated = true;
            break;
        }
        let mut sim = match snapshot::fork(cursor) {
            Ok(sim) => sim,
            Err(err) => {
                // A corrupted clone would poison every statistic below it.
                warn!(?err, "clone verification failed, aborting search");
                break;
            }
        };

        let mut path = vec![0usize];
        let mut evaluation: Option<f64> = None;

        // Selection: descend while fully expanded.
        loop {
            let node = *path.last().expect("path never empty");
            if !arena[node].untried.is_empty() {
                break;
            }
            if arena[node].children.is_empty() {
                evaluation = arena[node].terminal_value;
                break;
            }
            let (action, child) = select_child(&arena, node, searcher, config.exploration);
            path.push(child);
            match step(&mut sim, action, rng) {
                Step::Decision(_, _) => {}
                Step::Finished(outcome) => {
                    evaluation = Some(terminal_value(outcome, searcher));
                    break;
                }
                Step::Diverged => break,
            }
        }

        // Expansion: try one untried action uniformly at random.
        if evaluation.is_none() {
            let node = *path.last().expect("path never empty");
            if !arena[node].untried.is_empty() {
                let pick = rng.random_range(0..arena[node].untried.len());
                let action = arena[node].untried.swap_remove(pick);
                let child = match step(&mut sim, action, rng) {
                    Step::Decision(candidates, to_move) => {
                        SearchNode::new(Some(node), candidates, to_move)
                    }
                    Step::Finished(outcome) => {
                        let value = terminal_value(outcome, searcher);
                        evaluation = Some(value);
                        let mut leaf = SearchNode::new(Some(node), 0, searcher);
                        leaf.terminal_value = Some(value);
                        leaf
                    }
                    Step::Diverged => SearchNode::new(Some(node), 0, searcher),
                };
                let child_index = arena.len();
                arena.push(child);
                arena[node].children.push((action, child_index));
                path.push(child_index);
            }
        }

        // Rollout and evaluation.
        let value = match evaluation {
            Some(value) => value,
            None => rollout(&mut sim, searcher, config.rollout_depth, rng),
        };

        // Backpropagation: walk parent links from the leaf to the root.
        let mut current = Some(*path.last().expect("path never empty"));
        while let Some(index) = current {
            arena[index].visits += 1;
            arena[index].value_sum += value;
            current = arena[index].parent;
        }
        completed += 1;
    }

    // Robust child: most visits, ties to the first encountered.
    let root_visits: Vec<(usize, u32)> = arena[0]
        .children
        .iter()
        .map(|&(action, child)| (action, arena[child].visits))
        .collect();
    let chosen = if root_visits.is_empty() {
        // Zero completed simulations: fall back to uniform random.
        rng.random_range(0..candidate_count)
    } else {
        let mut best = root_visits[0];
        for &entry in &root_visits[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }
        best.0
    };

    (
        SearchReport {
            chosen,
            simulations: completed,
            truncated,
            root_visits,
        },
        arena,
    )
}

fn select_child(
    arena: &[SearchNode],
    node: usize,
    searcher: PlayerId,
    exploration: f64,
) -> (usize, usize) {
    let parent = &arena[node];
    let mut best: Option<((usize, usize), f64)> = None;
    for &(action, child_index) in &parent.children {
        let child = &arena[child_index];
        let mean = child.mean();
        // Flip exploitation when the opponent decides at this node.
        let exploit = if parent.to_move == searcher { mean } else { -mean };
        let score = ucb1(exploit, child.visits, parent.visits, exploration);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some(((action, child_index), score));
        }
    }
    best.expect("select_child called on node with children").0
}

/// Searches each decision with a fixed budget; both rollout players follow
/// the uniform random policy.
pub struct MctsSelector {
    config: MctsConfig,
    rng: StdRng,
}

impl MctsSelector {
    pub fn new(config: MctsConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Runs one search and returns the full report (the selector interface
    /// only keeps the chosen index).
    pub fn search(&mut self, cursor: &MatchCursor, request: &DecisionRequest) -> SearchReport {
        let (report, _) = run(cursor, request, &self.config, &mut self.rng);
        report
    }
}

impl ActionSelector for MctsSelector {
    fn choose_action(&mut self, cursor: &MatchCursor, request: &DecisionRequest) -> usize {
        let report = self.search(cursor, request);
        debug!(
            chosen = %request.candidates[report.chosen].description,
            simulations = report.simulations,
            truncated = report.truncated,
            "search committed"
        );
        report.chosen
    }
}
