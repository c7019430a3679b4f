//! End-to-end scenarios across the sequencer, catalog, selectors and
//! search.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::actions::ActionEffect;
use crate::card::Creature;
use crate::cards::{self, DeckList};
use crate::decision::{ActionSelector, UniformRandomSelector};
use crate::energy::EnergyKind;
use crate::game_loop::{DecisionRequest, MatchCursor, MatchEvent, run_match};
use crate::game_state::{MatchConfig, MatchState, Outcome};
use crate::ids::PlayerId;
use crate::mcts::{MctsConfig, MctsSelector};
use crate::player::Player;
use crate::turn::Phase;

/// Wraps a selector and counts how often the sequencer actually calls it.
struct CountingSelector<S> {
    inner: S,
    calls: usize,
}

impl<S: ActionSelector> CountingSelector<S> {
    fn new(inner: S) -> Self {
        Self { inner, calls: 0 }
    }
}

impl<S: ActionSelector> ActionSelector for CountingSelector<S> {
    fn choose_action(&mut self, cursor: &MatchCursor, request: &DecisionRequest) -> usize {
        assert!(
            request.candidates.len() > 1,
            "selector invoked for a singleton candidate set"
        );
        self.calls += 1;
        self.inner.choose_action(cursor, request)
    }
}

fn lone_creature_deck() -> DeckList {
    DeckList {
        cards: vec![cards::make("Sproutle").unwrap()],
        energy_kinds: vec![],
    }
}

fn standard_state(turn_limit: u32) -> MatchState {
    MatchState::new(
        Player::new(PlayerId::from_index(0), "Alice", cards::grass_deck()),
        Player::new(PlayerId::from_index(1), "Bob", cards::lightning_deck()),
        MatchConfig {
            turn_limit,
            ..MatchConfig::default()
        },
    )
}

#[test]
fn test_stalemate_match_draws_without_a_single_selector_call() {
    // No items, no supports, no energy kinds, no bench: every decision in
    // the match is a singleton, so neither selector is ever consulted and
    // the turn ceiling declares a draw.
    let mut rng = StdRng::seed_from_u64(21);
    let state = MatchState::new(
        Player::new(PlayerId::from_index(0), "Alice", lone_creature_deck()),
        Player::new(PlayerId::from_index(1), "Bob", lone_creature_deck()),
        MatchConfig {
            turn_limit: 40,
            ..MatchConfig::default()
        },
    );
    let mut p0 = CountingSelector::new(UniformRandomSelector::new(1));
    let mut p1 = CountingSelector::new(UniformRandomSelector::new(2));
    let outcome = {
        let mut selectors: [&mut dyn ActionSelector; 2] = [&mut p0, &mut p1];
        run_match(state, &mut selectors, &mut rng).unwrap()
    };
    assert_eq!(outcome, Outcome::Draw);
    assert_eq!(p0.calls, 0);
    assert_eq!(p1.calls, 0);
}

#[test]
fn test_full_match_conserves_card_multisets() {
    let mut rng = StdRng::seed_from_u64(33);
    let state = standard_state(60);
    let before: Vec<_> = state.players.iter().map(|p| p.card_multiset()).collect();

    let mut cursor = MatchCursor::new(state, &mut rng);
    let mut selectors = [
        UniformRandomSelector::new(100),
        UniformRandomSelector::new(200),
    ];
    loop {
        match cursor.advance(&mut rng) {
            MatchEvent::Finished(outcome) => {
                assert!(outcome.is_finished());
                break;
            }
            MatchEvent::Decision(request) => {
                let index = selectors[request.player.index()]
                    .choose_action(&cursor, &request);
                cursor.resume(index, &mut rng).unwrap();
            }
        }
    }
    let after: Vec<_> = cursor
        .state()
        .players
        .iter()
        .map(|p| p.card_multiset())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_same_seed_replays_identically() {
    let play = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cursor = MatchCursor::new(standard_state(60), &mut rng);
        let mut selectors = [
            UniformRandomSelector::new(seed + 1),
            UniformRandomSelector::new(seed + 2),
        ];
        loop {
            match cursor.advance(&mut rng) {
                MatchEvent::Finished(outcome) => return (outcome, cursor.state().turn),
                MatchEvent::Decision(request) => {
                    let index = selectors[request.player.index()]
                        .choose_action(&cursor, &request);
                    cursor.resume(index, &mut rng).unwrap();
                }
            }
        }
    };
    assert_eq!(play(77), play(77));
}

#[test]
fn test_random_matches_finish_within_the_ceiling() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut p0 = UniformRandomSelector::new(seed * 2 + 1);
        let mut p1 = UniformRandomSelector::new(seed * 2 + 2);
        let mut selectors: [&mut dyn ActionSelector; 2] = [&mut p0, &mut p1];
        let outcome = run_match(standard_state(80), &mut selectors, &mut rng).unwrap();
        assert!(outcome.is_finished());
    }
}

#[test]
fn test_mcts_selector_drives_a_full_match() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut p0 = MctsSelector::new(
        MctsConfig {
            simulations: 10,
            rollout_depth: 5,
            ..MctsConfig::default()
        },
        9,
    );
    let mut p1 = UniformRandomSelector::new(10);
    let mut selectors: [&mut dyn ActionSelector; 2] = [&mut p0, &mut p1];
    let outcome = run_match(standard_state(40), &mut selectors, &mut rng).unwrap();
    assert!(outcome.is_finished());
}

#[test]
fn test_mcts_commits_the_lethal_attack_in_a_real_decision() {
    // Candidate 0 passes, candidate 1 wins on the spot: after N = 10
    // simulations the attack must dominate the visit counts.
    let mut rng = StdRng::seed_from_u64(1);
    let empty = || DeckList {
        cards: vec![],
        energy_kinds: vec![],
    };
    let mut state = MatchState::new(
        Player::new(PlayerId::from_index(0), "Alice", empty()),
        Player::new(PlayerId::from_index(1), "Bob", empty()),
        MatchConfig::default(),
    );
    state.turn = 4;
    let mut attacker = Creature::from_card(&cards::make("Sproutle").unwrap()).unwrap();
    attacker.energy.attach(EnergyKind::Grass);
    state.players[0].active = Some(attacker);
    let mut defender = Creature::from_card(&cards::make("Sparkit").unwrap()).unwrap();
    defender.hp = 10;
    state.players[1].active = Some(defender);

    let mut cursor = MatchCursor::test_harness(state, Phase::Attack);
    let MatchEvent::Decision(request) = cursor.advance(&mut rng) else {
        panic!("expected the attack decision");
    };
    assert_eq!(request.candidates.len(), 2);
    assert!(matches!(
        request.candidates[1].effect,
        ActionEffect::Attack { .. }
    ));

    let mut selector = MctsSelector::new(
        MctsConfig {
            simulations: 10,
            rollout_depth: 10,
            ..MctsConfig::default()
        },
        42,
    );
    let report = selector.search(&cursor, &request);
    assert_eq!(report.chosen, 1);
    let pass_visits = report
        .root_visits
        .iter()
        .find(|&&(action, _)| action == 0)
        .map(|&(_, visits)| visits)
        .unwrap_or(0);
    let attack_visits = report
        .root_visits
        .iter()
        .find(|&&(action, _)| action == 1)
        .map(|&(_, visits)| visits)
        .unwrap_or(0);
    assert!(attack_visits > pass_visits);

    // Committing the action ends the match in Alice's favor.
    cursor.resume(report.chosen, &mut rng).unwrap();
    assert_eq!(
        cursor.advance(&mut rng),
        MatchEvent::Finished(Outcome::Winner(PlayerId::from_index(0)))
    );
}

#[test]
fn test_knockout_mid_turn_promotes_the_defender() {
    let mut rng = StdRng::seed_from_u64(2);
    let empty = || DeckList {
        cards: vec![],
        energy_kinds: vec![],
    };
    let mut state = MatchState::new(
        Player::new(PlayerId::from_index(0), "Alice", empty()),
        Player::new(PlayerId::from_index(1), "Bob", empty()),
        MatchConfig::default(),
    );
    state.turn = 4;
    let mut attacker = Creature::from_card(&cards::make("Sproutle").unwrap()).unwrap();
    attacker.energy.attach(EnergyKind::Grass);
    state.players[0].active = Some(attacker);
    let mut defender = Creature::from_card(&cards::make("Sparkit").unwrap()).unwrap();
    defender.hp = 10;
    state.players[1].active = Some(defender);
    for name in ["Dozeling", "Mirelurk"] {
        state.players[1]
            .bench
            .push(Creature::from_card(&cards::make(name).unwrap()).unwrap());
    }

    let mut cursor = MatchCursor::test_harness(state, Phase::Attack);
    let MatchEvent::Decision(request) = cursor.advance(&mut rng) else {
        panic!("expected the attack decision");
    };
    // Take the attack: Sparkit is knocked out, Alice scores, and Bob (the
    // waiting player) must immediately choose a replacement.
    let attack_index = request
        .candidates
        .iter()
        .position(|c| matches!(c.effect, ActionEffect::Attack { .. }))
        .unwrap();
    cursor.resume(attack_index, &mut rng).unwrap();
    let MatchEvent::Decision(promotion) = cursor.advance(&mut rng) else {
        panic!("expected a promotion decision");
    };
    assert_eq!(promotion.player, PlayerId::from_index(1));
    assert_eq!(promotion.candidates.len(), 2);
    cursor.resume(0, &mut rng).unwrap();
    assert_eq!(
        cursor.state().players[1].active.as_ref().unwrap().name(),
        "Dozeling"
    );
    assert_eq!(cursor.state().players[0].points, 1);
    assert_eq!(cursor.state().outcome, Outcome::InProgress);
}
