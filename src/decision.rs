//! Action selectors: the boundary between the sequencer and whoever (or
//! whatever) picks among candidates.
//!
//! Contract: `choose_action` returns an index in
//! `0..request.candidates.len()`, and is never invoked for a singleton
//! candidate set; the sequencer applies those itself.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::game_loop::{DecisionRequest, MatchCursor};
use crate::game_state::{MatchState, Outcome};
use crate::ids::PlayerId;
use crate::snapshot;

/// Chooses among enumerated candidates for one decision.
pub trait ActionSelector {
    fn choose_action(&mut self, cursor: &MatchCursor, request: &DecisionRequest) -> usize;
}

// ============================================================================
// Uniform random
// ============================================================================

/// Picks uniformly among all candidate indices; the rollout policy.
///
/// Side-effect-free apart from consuming its own random stream.
#[derive(Debug)]
pub struct UniformRandomSelector {
    rng: StdRng,
}

impl UniformRandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for UniformRandomSelector {
    fn choose_action(&mut self, _cursor: &MatchCursor, request: &DecisionRequest) -> usize {
        self.rng.random_range(0..request.candidates.len())
    }
}

// ============================================================================
// Interactive
// ============================================================================

/// External decision source (human, network) an `InteractiveSelector`
/// blocks on. Returning `None` means the source timed out or went away.
pub trait DecisionSource {
    fn prompt(&mut self, request: &DecisionRequest) -> Option<usize>;
}

/// Forwards candidates to an external source. Invalid answers are
/// re-prompted; a timeout resolves to index 0 so the sequencer is never
/// blocked forever.
pub struct InteractiveSelector<S: DecisionSource> {
    source: S,
}

impl<S: DecisionSource> InteractiveSelector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: DecisionSource> ActionSelector for InteractiveSelector<S> {
    fn choose_action(&mut self, _cursor: &MatchCursor, request: &DecisionRequest) -> usize {
        loop {
            match self.source.prompt(request) {
                None => {
                    warn!("decision source timed out, defaulting to first candidate");
                    return 0;
                }
                Some(index) if index < request.candidates.len() => return index,
                Some(index) => {
                    warn!(index, len = request.candidates.len(), "invalid choice, re-prompting");
                }
            }
        }
    }
}

// ============================================================================
// Heuristic
// ============================================================================

/// Weighted-sum evaluation of a state from one player's perspective.
///
/// Own material adds, opponent material subtracts; every weight is
/// monotonic in the intuitive direction.
pub fn score_state(state: &MatchState, perspective: PlayerId) -> f64 {
    let me = state.player(perspective);
    let them = state.player(perspective.opponent());

    let mut score = 0.0;
    if let Some(active) = &me.active {
        score += active.hp as f64 * 0.2;
    }
    score += me
        .bench
        .iter()
        .map(|c| c.hp as f64 * 0.1)
        .sum::<f64>();
    score += me.attached_energy_total() as f64 * 3.0;
    score += me.bench.len() as f64 * 6.0;
    score += me.hand_size() as f64 * 2.0;
    score += me.points as f64 * 30.0;

    if let Some(active) = &them.active {
        score -= active.hp as f64 * 0.2;
    }
    score -= them
        .bench
        .iter()
        .map(|c| c.hp as f64 * 0.1)
        .sum::<f64>();
    score -= them.attached_energy_total() as f64 * 3.0;
    score -= them.bench.len() as f64 * 4.0;
    score -= them.hand_size() as f64 * 2.0;

    score
}

/// `score_state` linearly squeezed into roughly [-1, 1] for use as a
/// rollout evaluation at the depth cutoff.
pub fn normalized_score(state: &MatchState, perspective: PlayerId) -> f64 {
    (score_state(state, perspective) / 250.0).clamp(-1.0, 1.0)
}

/// One-ply lookahead: probe each candidate on a clone, score the result,
/// and take the argmax (ties to the lowest index). The real state is never
/// touched.
pub struct HeuristicSelector {
    rng: StdRng,
}

impl HeuristicSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn probe(&mut self, cursor: &MatchCursor, index: usize, me: PlayerId) -> f64 {
        let mut clone = match snapshot::fork(cursor) {
            Ok(clone) => clone,
            Err(err) => {
                warn!(?err, "clone verification failed, scoring candidate as worthless");
                return f64::NEG_INFINITY;
            }
        };
        if clone.resume(index, &mut self.rng).is_err() {
            return f64::NEG_INFINITY;
        }
        let state = clone.state();
        match state.outcome {
            Outcome::Winner(winner) if winner == me => f64::INFINITY,
            Outcome::Winner(_) => f64::NEG_INFINITY,
            Outcome::Draw => 0.0,
            Outcome::InProgress => score_state(state, me),
        }
    }
}

impl ActionSelector for HeuristicSelector {
    fn choose_action(&mut self, cursor: &MatchCursor, request: &DecisionRequest) -> usize {
        let me = request.player;
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for index in 0..request.candidates.len() {
            let score = self.probe(cursor, index, me);
            if score > best_score {
                best_score = score;
                best_index = index;
            }
        }
        debug!(
            chosen = %request.candidates[best_index].description,
            score = best_score,
            "heuristic choice"
        );
        best_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Creature;
    use crate::cards;
    use crate::game_state::MatchConfig;
    use crate::player::Player;

    fn scored_state() -> MatchState {
        let mut state = MatchState::new(
            Player::new(PlayerId::from_index(0), "Alice", cards::grass_deck()),
            Player::new(PlayerId::from_index(1), "Bob", cards::lightning_deck()),
            MatchConfig::default(),
        );
        for player in &mut state.players {
            let card = cards::make("Sproutle").unwrap();
            player.active = Creature::from_card(&card);
        }
        state
    }

    #[test]
    fn test_score_is_zero_sum_flavored_for_mirror_states() {
        let state = scored_state();
        let a = score_state(&state, PlayerId::from_index(0));
        let b = score_state(&state, PlayerId::from_index(1));
        // Mirror material, symmetric terms cancel except the asymmetric
        // bench weight, which is zero here.
        assert_eq!(a, b);
    }

    #[test]
    fn test_more_own_hp_never_lowers_score() {
        let mut state = scored_state();
        let before = score_state(&state, PlayerId::from_index(0));
        state.players[0].active.as_mut().unwrap().take_damage(30);
        let after = score_state(&state, PlayerId::from_index(0));
        assert!(after < before);
    }

    #[test]
    fn test_points_raise_own_score_only() {
        let mut state = scored_state();
        let p0_before = score_state(&state, PlayerId::from_index(0));
        let p1_before = score_state(&state, PlayerId::from_index(1));
        state.players[1].points += 1;
        assert!(score_state(&state, PlayerId::from_index(1)) > p1_before);
        assert!(score_state(&state, PlayerId::from_index(0)) <= p0_before);
    }

    #[test]
    fn test_normalized_score_stays_in_unit_range() {
        let mut state = scored_state();
        state.players[0].points = 99;
        assert_eq!(normalized_score(&state, PlayerId::from_index(0)), 1.0);
        assert_eq!(normalized_score(&state, PlayerId::from_index(1)), -1.0);
        state.players[0].points = 0;
        let mid = normalized_score(&state, PlayerId::from_index(0));
        assert!((-1.0..=1.0).contains(&mid));
    }

    struct ScriptedSource {
        answers: Vec<Option<usize>>,
        prompts: usize,
    }

    impl DecisionSource for ScriptedSource {
        fn prompt(&mut self, _request: &DecisionRequest) -> Option<usize> {
            let answer = self.answers.remove(0);
            self.prompts += 1;
            answer
        }
    }

    fn decision_cursor() -> (MatchCursor, DecisionRequest) {
        use crate::cards::DeckList;
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        let mut rng = StdRng::seed_from_u64(5);
        let empty = || DeckList {
            cards: vec![],
            energy_kinds: vec![],
        };
        let mut state = MatchState::new(
            Player::new(PlayerId::from_index(0), "Alice", empty()),
            Player::new(PlayerId::from_index(1), "Bob", empty()),
            MatchConfig::default(),
        );
        // Two distinct basics each: whoever sets up first faces a real
        // active-creature choice.
        for player in &mut state.players {
            player.put_in_hand(cards::make("Sproutle").unwrap());
            player.put_in_hand(cards::make("Mirelurk").unwrap());
        }
        let mut cursor = crate::game_loop::MatchCursor::new(state, &mut rng);
        loop {
            match cursor.advance(&mut rng) {
                crate::game_loop::MatchEvent::Decision(request) => return (cursor, request),
                crate::game_loop::MatchEvent::Finished(_) => panic!("match ended in setup"),
            }
        }
    }

    #[test]
    fn test_interactive_reprompts_on_invalid_index() {
        let (cursor, request) = decision_cursor();
        let len = request.candidates.len();
        let mut selector = InteractiveSelector::new(ScriptedSource {
            answers: vec![Some(len + 3), Some(1)],
            prompts: 0,
        });
        let chosen = selector.choose_action(&cursor, &request);
        assert_eq!(chosen, 1);
        assert_eq!(selector.source.prompts, 2);
    }

    #[test]
    fn test_interactive_timeout_defaults_to_zero() {
        let (cursor, request) = decision_cursor();
        let mut selector = InteractiveSelector::new(ScriptedSource {
            answers: vec![None],
            prompts: 0,
        });
        assert_eq!(selector.choose_action(&cursor, &request), 0);
    }

    #[test]
    fn test_uniform_random_returns_valid_indices() {
        let (cursor, request) = decision_cursor();
        let mut selector = UniformRandomSelector::new(123);
        for _ in 0..50 {
            let index = selector.choose_action(&cursor, &request);
            assert!(index < request.candidates.len());
        }
    }

    #[test]
    fn test_heuristic_never_mutates_the_real_cursor() {
        let (cursor, request) = decision_cursor();
        let before = cursor.state().clone();
        let mut selector = HeuristicSelector::new(7);
        let index = selector.choose_action(&cursor, &request);
        assert!(index < request.candidates.len());
        assert_eq!(cursor.state(), &before);
    }
}
