//! Action catalog: enumerates and deduplicates the legal candidates for a
//! decision point.
//!
//! Candidates are plain data: a description, a tagged effect, and (inside
//! the effect) any target reference. One dispatch function in `effects`
//! applies them; nothing here captures closures, so candidates can be
//! compared, logged and serialized.
//!
//! Index 0 of every optional phase is the pass / "do nothing" candidate
//! (for subset phases the empty subset plays that role). Mandatory
//! selections (the setup active pick and knockout promotion) enumerate
//! real options only.

use std::collections::HashSet;

use crate::card::CardKind;
use crate::effects::{self, Usability};
use crate::energy::EnergyPool;
use crate::game_state::MatchState;
use crate::ids::{CardId, PlayerId};
use crate::player::{CreatureRef, Slot};
use crate::turn::{Phase, SetupStep};

/// One enumerated, deduplicated legal action.
///
/// Owned by the catalog's output list for the duration of one decision;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Candidate {
    pub description: String,
    pub effect: ActionEffect,
}

impl Candidate {
    fn pass(description: &str) -> Self {
        Self {
            description: description.to_string(),
            effect: ActionEffect::Pass,
        }
    }
}

/// Tagged effect of a candidate. The card ID (where present) names the
/// external collaborator whose effect runs; `effects::apply` dispatches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub enum ActionEffect {
    /// Do nothing this phase.
    Pass,
    /// Play an item card, optionally on a target.
    PlayItem {
        card: CardId,
        target: Option<CreatureRef>,
    },
    /// Play a support card, optionally on a target.
    PlaySupport {
        card: CardId,
        target: Option<CreatureRef>,
    },
    /// Evolve the creature at `onto` with the named hand card.
    Evolve { card: CardId, onto: CreatureRef },
    /// Deploy the given basic creatures from hand to the bench.
    Deploy { cards: Vec<CardId> },
    /// Attach the pending energy token to a creature.
    AttachEnergy { to: CreatureRef },
    /// Swap the active creature with a bench creature, paying energy.
    Retreat {
        bench_index: usize,
        payment: EnergyPool,
    },
    /// Use an attack against a target.
    Attack {
        attack_index: usize,
        target: CreatureRef,
    },
    /// Setup: send a basic creature from hand to the active slot.
    ChooseActive { card: CardId },
    /// Promote a bench creature into the empty active slot.
    Promote { bench_index: usize },
}

/// Semantic identity of a candidate, used for deduplication.
///
/// Hand copies are compared by card name, not instance, so two physically
/// identical copies aimed at the same target collapse into one candidate.
/// Board targets keep instance identity (two same-name creatures on the
/// field can be in different shape).
#[derive(Debug, PartialEq, Eq, Hash)]
enum SemanticKey {
    Card {
        name: &'static str,
        target: Option<CreatureRef>,
    },
    Evolve {
        name: &'static str,
        onto: CreatureRef,
    },
    DeploySet(Vec<&'static str>),
    Retreat {
        bench: CardId,
        payment: EnergyPool,
    },
    ChooseActive(&'static str),
}

/// Builds the candidate list for the given phase of the active player's
/// turn.
pub fn legal_actions(state: &MatchState, phase: Phase) -> Vec<Candidate> {
    match phase {
        Phase::Item => item_actions(state),
        Phase::Support => support_actions(state),
        Phase::Evolution => evolution_actions(state),
        Phase::Deploy => deploy_actions(state),
        Phase::EnergyAttach => energy_actions(state),
        Phase::Ability => vec![Candidate::pass("No ability to use")],
        Phase::Retreat => retreat_actions(state),
        Phase::Attack => attack_actions(state),
    }
}

fn item_actions(state: &MatchState) -> Vec<Candidate> {
    let player = state.active_player();
    let mut candidates = vec![Candidate::pass("Use no item")];
    let mut seen = HashSet::new();
    for card in &player.hand_items {
        let CardKind::Item(effect) = card.kind else {
            continue;
        };
        match effects::item_usability(state, player.id, effect) {
            Usability::NotUsable => {}
            Usability::Usable => {
                if seen.insert(SemanticKey::Card {
                    name: card.name,
                    target: None,
                }) {
                    candidates.push(Candidate {
                        description: format!("Use {}", card.name),
                        effect: ActionEffect::PlayItem {
                            card: card.id,
                            target: None,
                        },
                    });
                }
            }
            Usability::UsableWithTargets(targets) => {
                for target in targets {
                    if seen.insert(SemanticKey::Card {
                        name: card.name,
                        target: Some(target),
                    }) {
                        candidates.push(Candidate {
                            description: format!(
                                "Use {} on {}",
                                card.name,
                                describe_target(state, target)
                            ),
                            effect: ActionEffect::PlayItem {
                                card: card.id,
                                target: Some(target),
                            },
                        });
                    }
                }
            }
        }
    }
    candidates
}

fn support_actions(state: &MatchState) -> Vec<Candidate> {
    let player = state.active_player();
    let mut candidates = vec![Candidate::pass("Use no support card")];
    let mut seen = HashSet::new();
    for card in &player.hand_supports {
        let CardKind::Support(effect) = card.kind else {
            continue;
        };
        match effects::support_usability(state, player.id, effect) {
            Usability::NotUsable => {}
            Usability::Usable => {
                if seen.insert(SemanticKey::Card {
                    name: card.name,
                    target: None,
                }) {
                    candidates.push(Candidate {
                        description: format!("Use {}", card.name),
                        effect: ActionEffect::PlaySupport {
                            card: card.id,
                            target: None,
                        },
                    });
                }
            }
            Usability::UsableWithTargets(targets) => {
                for target in targets {
                    if seen.insert(SemanticKey::Card {
                        name: card.name,
                        target: Some(target),
                    }) {
                        candidates.push(Candidate {
                            description: format!(
                                "Use {} on {}",
                                card.name,
                                describe_target(state, target)
                            ),
                            effect: ActionEffect::PlaySupport {
                                card: card.id,
                                target: Some(target),
                            },
                        });
                    }
                }
            }
        }
    }
    candidates
}

fn evolution_actions(state: &MatchState) -> Vec<Candidate> {
    let mut candidates = vec![Candidate::pass("Evolve nothing")];
    if !state.can_evolve() {
        return candidates;
    }
    let player = state.active_player();
    let mut seen = HashSet::new();
    for slot in player.field_slots() {
        let Some(creature) = player.creature_at(slot) else {
            continue;
        };
        for card in &player.hand_creatures {
            let Some(def) = card.as_creature() else {
                continue;
            };
            if def.evolves_from != Some(creature.name()) {
                continue;
            }
            let onto = CreatureRef::new(player.id, slot);
            if seen.insert(SemanticKey::Evolve {
                name: card.name,
                onto,
            }) {
                candidates.push(Candidate {
                    description: format!("Evolve {} into {}", creature.name(), card.name),
                    effect: ActionEffect::Evolve { card: card.id, onto },
                });
            }
        }
    }
    candidates
}

fn deploy_actions(state: &MatchState) -> Vec<Candidate> {
    let player = state.active_player();
    let capacity = state
        .config
        .bench_capacity
        .saturating_sub(player.bench.len());
    subset_deploy_candidates(state, player.id, capacity, "Deploy nothing")
}

/// Candidates for filling bench slots with basic creatures from hand: all
/// subsets from size 0 up to `capacity`, enumerated by combinations and
/// deduplicated by name composition.
fn subset_deploy_candidates(
    state: &MatchState,
    player_id: PlayerId,
    capacity: usize,
    pass_label: &str,
) -> Vec<Candidate> {
    let player = state.player(player_id);
    let basics: Vec<usize> = player
        .hand_creatures
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_basic_creature())
        .map(|(i, _)| i)
        .collect();

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    for size in 0..=capacity.min(basics.len()) {
        for combo in index_combinations(&basics, size) {
            let mut names: Vec<&'static str> = combo
                .iter()
                .map(|&i| player.hand_creatures[i].name)
                .collect();
            names.sort_unstable();
            if !seen.insert(SemanticKey::DeploySet(names.clone())) {
                continue;
            }
            if combo.is_empty() {
                candidates.push(Candidate::pass(pass_label));
            } else {
                candidates.push(Candidate {
                    description: format!("Send {} to the bench", names.join(", ")),
                    effect: ActionEffect::Deploy {
                        cards: combo
                            .iter()
                            .map(|&i| player.hand_creatures[i].id)
                            .collect(),
                    },
                });
            }
        }
    }
    candidates
}

fn energy_actions(state: &MatchState) -> Vec<Candidate> {
    let player = state.active_player();
    let Some(kind) = player.pending_energy else {
        return vec![Candidate::pass("No energy to attach")];
    };
    let mut candidates = vec![Candidate::pass("Attach no energy")];
    for slot in player.field_slots() {
        let target = CreatureRef::new(player.id, slot);
        candidates.push(Candidate {
            description: format!(
                "Attach {} energy to {}",
                kind.name(),
                describe_target(state, target)
            ),
            effect: ActionEffect::AttachEnergy { to: target },
        });
    }
    candidates
}

fn retreat_actions(state: &MatchState) -> Vec<Candidate> {
    let player = state.active_player();
    let mut candidates = vec![Candidate::pass("Stay in")];
    let Some(active) = player.active.as_ref() else {
        return candidates;
    };
    if player.bench.is_empty() || !active.can_retreat(player.buffs.move_discount) {
        return candidates;
    }
    let cost = active.retreat_cost_with(player.buffs.move_discount);
    let payments = active.energy.subsets_of_size(cost);
    let mut seen = HashSet::new();
    for (bench_index, bench_creature) in player.bench.iter().enumerate() {
        for payment in &payments {
            if !seen.insert(SemanticKey::Retreat {
                bench: bench_creature.id,
                payment: *payment,
            }) {
                continue;
            }
            candidates.push(Candidate {
                description: format!(
                    "Retreat {} for {} paying {}",
                    active.name(),
                    bench_creature.name(),
                    payment.describe()
                ),
                effect: ActionEffect::Retreat {
                    bench_index,
                    payment: *payment,
                },
            });
        }
    }
    candidates
}

fn attack_actions(state: &MatchState) -> Vec<Candidate> {
    let mut candidates = vec![Candidate::pass("End the turn")];
    if !state.can_attack() {
        return candidates;
    }
    let player = state.active_player();
    let Some(active) = player.active.as_ref() else {
        return candidates;
    };
    if active.status.blocks_acting() {
        return candidates;
    }
    let opponent = state.waiting_player();
    if opponent.active.is_none() {
        return candidates;
    }
    let target = CreatureRef::new(opponent.id, Slot::Active);
    for attack_index in active.usable_attacks() {
        let attack = &active.base.attacks[attack_index];
        candidates.push(Candidate {
            description: format!(
                "Attack with {} targeting {}",
                attack.name,
                describe_target(state, target)
            ),
            effect: ActionEffect::Attack {
                attack_index,
                target,
            },
        });
    }
    candidates
}

/// Builds the candidate list for one setup step of the given player.
pub fn setup_actions(state: &MatchState, player_id: PlayerId, step: SetupStep) -> Vec<Candidate> {
    match step {
        SetupStep::SelectActive => {
            let player = state.player(player_id);
            let mut candidates = Vec::new();
            let mut seen = HashSet::new();
            for card in &player.hand_creatures {
                if !card.is_basic_creature() {
                    continue;
                }
                if seen.insert(SemanticKey::ChooseActive(card.name)) {
                    candidates.push(Candidate {
                        description: format!("Send out {}", card.name),
                        effect: ActionEffect::ChooseActive { card: card.id },
                    });
                }
            }
            candidates
        }
        SetupStep::SelectBench => subset_deploy_candidates(
            state,
            player_id,
            state.config.bench_capacity,
            "Bench nothing",
        ),
    }
}

/// Builds the mandatory promotion choices after a knockout: one candidate
/// per bench creature.
pub fn promotion_actions(state: &MatchState, player_id: PlayerId) -> Vec<Candidate> {
    state
        .player(player_id)
        .bench
        .iter()
        .enumerate()
        .map(|(bench_index, creature)| Candidate {
            description: format!("Promote {}", creature.name()),
            effect: ActionEffect::Promote { bench_index },
        })
        .collect()
}

fn describe_target(state: &MatchState, target: CreatureRef) -> String {
    match state.player(target.player).creature_at(target.slot) {
        Some(creature) => match target.slot {
            Slot::Active => creature.name().to_string(),
            Slot::Bench(i) => format!("{} (bench {})", creature.name(), i),
        },
        None => "an empty slot".to_string(),
    }
}

/// All `size`-element combinations of `items`, in index order.
fn index_combinations(items: &[usize], size: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    fn recurse(
        items: &[usize],
        start: usize,
        size: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            recurse(items, i + 1, size, current, out);
            current.pop();
        }
    }
    recurse(items, 0, size, &mut current, &mut out);
    out
}
