//! Effect dispatch: the one place candidate effects mutate match state.
//!
//! `apply` is keyed by the candidate's effect tag; card effects resolve by
//! looking the card up in the acting player's hand. Applying an effect may
//! raise the match-terminated signal (`MatchOver`), which unwinds to the
//! phase loop.

use rand::Rng;
use tracing::{debug, info};

use crate::actions::ActionEffect;
use crate::card::{AttackEffect, CardKind, Creature, ItemEffect, Status, SupportEffect};
use crate::game_state::{MatchOver, MatchState};
use crate::ids::PlayerId;
use crate::player::{CreatureRef, Slot};

/// Capability answer for a card or ability: the three-way contract the
/// action catalog consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usability {
    NotUsable,
    Usable,
    UsableWithTargets(Vec<CreatureRef>),
}

/// Whether (and on what) an item card can currently be used.
pub fn item_usability(state: &MatchState, actor: PlayerId, effect: ItemEffect) -> Usability {
    let player = state.player(actor);
    match effect {
        ItemEffect::Heal(_) => {
            let targets: Vec<CreatureRef> = player
                .field_slots()
                .into_iter()
                .filter(|&slot| {
                    player
                        .creature_at(slot)
                        .is_some_and(|c| c.is_damaged())
                })
                .map(|slot| CreatureRef::new(actor, slot))
                .collect();
            if targets.is_empty() {
                Usability::NotUsable
            } else {
                Usability::UsableWithTargets(targets)
            }
        }
        ItemEffect::FetchBasic => {
            if player.deck.contains_basic() {
                Usability::Usable
            } else {
                Usability::NotUsable
            }
        }
        ItemEffect::MoveDiscount(_) => Usability::Usable,
    }
}

/// Whether (and on what) a support card can currently be used.
pub fn support_usability(state: &MatchState, actor: PlayerId, effect: SupportEffect) -> Usability {
    match effect {
        SupportEffect::DrawCards(_) => {
            if state.player(actor).deck.is_empty() {
                Usability::NotUsable
            } else {
                Usability::Usable
            }
        }
        SupportEffect::AttackBonus(_) | SupportEffect::MoveDiscount(_) => Usability::Usable,
        SupportEffect::SwitchOpponent => {
            let opponent = state.player(actor.opponent());
            if opponent.active.is_none() {
                return Usability::NotUsable;
            }
            let targets: Vec<CreatureRef> = (0..opponent.bench.len())
                .map(|i| CreatureRef::new(opponent.id, Slot::Bench(i)))
                .collect();
            if targets.is_empty() {
                Usability::NotUsable
            } else {
                Usability::UsableWithTargets(targets)
            }
        }
    }
}

/// Applies a chosen candidate effect for `actor`.
///
/// Returns the match-terminated signal if the effect ends the match.
pub fn apply(
    state: &mut MatchState,
    actor: PlayerId,
    effect: &ActionEffect,
    rng: &mut impl Rng,
) -> Result<(), MatchOver> {
    match effect {
        ActionEffect::Pass => Ok(()),
        ActionEffect::PlayItem { card, target } => {
            let Some(card) = state.player_mut(actor).take_from_hand(*card) else {
                return Ok(());
            };
            let CardKind::Item(item) = &card.kind else {
                state.player_mut(actor).put_in_hand(card);
                return Ok(());
            };
            let item = *item;
            debug!(player = %state.player(actor).name, card = card.name, "item played");
            match item {
                ItemEffect::Heal(amount) => {
                    if let Some(target) = *target
                        && let Some(creature) =
                            state.player_mut(target.player).creature_at_mut(target.slot)
                    {
                        creature.heal(amount);
                    }
                }
                ItemEffect::FetchBasic => {
                    let player = state.player_mut(actor);
                    if let Some(found) = player.deck.take_first_basic(rng) {
                        player.put_in_hand(found);
                    }
                }
                ItemEffect::MoveDiscount(amount) => {
                    state.player_mut(actor).buffs.move_discount += amount;
                }
            }
            state.player_mut(actor).discard.push(card);
            Ok(())
        }
        ActionEffect::PlaySupport { card, target } => {
            let Some(card) = state.player_mut(actor).take_from_hand(*card) else {
                return Ok(());
            };
            let CardKind::Support(support) = &card.kind else {
                state.player_mut(actor).put_in_hand(card);
                return Ok(());
            };
            let support = *support;
            debug!(player = %state.player(actor).name, card = card.name, "support played");
            match support {
                SupportEffect::DrawCards(count) => {
                    state.player_mut(actor).draw(count as usize);
                }
                SupportEffect::AttackBonus(amount) => {
                    state.player_mut(actor).buffs.attack_bonus += amount;
                }
                SupportEffect::MoveDiscount(amount) => {
                    state.player_mut(actor).buffs.move_discount += amount;
                }
                SupportEffect::SwitchOpponent => {
                    if let Some(target) = *target
                        && let Slot::Bench(index) = target.slot
                    {
                        switch_active_with_bench(state, target.player, index);
                    }
                }
            }
            state.player_mut(actor).discard.push(card);
            Ok(())
        }
        ActionEffect::Evolve { card, onto } => {
            let player = state.player_mut(actor);
            let Some(card) = player.take_from_hand(*card) else {
                return Ok(());
            };
            let Some(mut evolved) = Creature::from_card(&card) else {
                player.put_in_hand(card);
                return Ok(());
            };
            if let Some(previous) = player.creature_at_mut(onto.slot) {
                // Damage and attached energy carry over; status resets.
                evolved.hp = evolved.base.max_hp.saturating_sub(previous.damage_taken());
                evolved.energy = previous.energy;
                let old = std::mem::replace(previous, evolved);
                info!(from = old.name(), to = card.name, "creature evolved");
                player.discard.push(old.into_card());
            } else {
                player.put_in_hand(card);
            }
            Ok(())
        }
        ActionEffect::Deploy { cards } => {
            let player = state.player_mut(actor);
            for id in cards {
                let Some(card) = player.take_from_hand(*id) else {
                    continue;
                };
                match Creature::from_card(&card) {
                    Some(creature) => {
                        debug!(creature = creature.name(), "deployed to bench");
                        player.bench.push(creature);
                    }
                    None => player.put_in_hand(card),
                }
            }
            Ok(())
        }
        ActionEffect::AttachEnergy { to } => {
            let player = state.player_mut(actor);
            if let Some(kind) = player.pending_energy.take()
                && let Some(creature) = player.creature_at_mut(to.slot)
            {
                creature.energy.attach(kind);
                debug!(kind = kind.name(), creature = creature.name(), "energy attached");
            }
            Ok(())
        }
        ActionEffect::Retreat {
            bench_index,
            payment,
        } => {
            let player = state.player_mut(actor);
            if let Some(active) = player.active.as_mut()
                && *bench_index < player.bench.len()
                && active.energy.pay(payment)
            {
                active.status = Status::Normal;
                std::mem::swap(active, &mut player.bench[*bench_index]);
                debug!(player = %player.name, "retreated");
            }
            Ok(())
        }
        ActionEffect::Attack {
            attack_index,
            target,
        } => resolve_attack(state, actor, *attack_index, *target),
        ActionEffect::ChooseActive { card } => {
            let player = state.player_mut(actor);
            if let Some(card) = player.take_from_hand(*card) {
                player.active = Creature::from_card(&card);
                if player.active.is_none() {
                    // Non-creature card slipped through; put it back.
                    player.put_in_hand(card);
                }
            }
            Ok(())
        }
        ActionEffect::Promote { bench_index } => {
            let player = state.player_mut(actor);
            if player.promote_from_bench(*bench_index) {
                info!(
                    player = %player.name,
                    creature = player.active.as_ref().map(|c| c.name()).unwrap_or(""),
                    "promoted from bench"
                );
            }
            Ok(())
        }
    }
}

/// Swaps a player's active creature with their bench creature at `index`,
/// clearing the benched creature's status.
fn switch_active_with_bench(state: &mut MatchState, player_id: PlayerId, index: usize) {
    let player = state.player_mut(player_id);
    if let Some(active) = player.active.as_mut()
        && index < player.bench.len()
    {
        active.status = Status::Normal;
        std::mem::swap(active, &mut player.bench[index]);
    }
}

fn resolve_attack(
    state: &mut MatchState,
    actor: PlayerId,
    attack_index: usize,
    target: CreatureRef,
) -> Result<(), MatchOver> {
    let attacker_player = state.player(actor);
    let Some(attacker) = attacker_player.active.as_ref() else {
        return Ok(());
    };
    let Some(attack) = attacker.base.attacks.get(attack_index).cloned() else {
        return Ok(());
    };
    let attacker_type = attacker.base.creature_type;
    let bonus = attacker_player.buffs.attack_bonus;

    let knocked_out = {
        let defender_player = state.player_mut(target.player);
        let Some(defender) = defender_player.creature_at_mut(target.slot) else {
            return Ok(());
        };
        let weakness_bonus = if defender.base.weakness == Some(attacker_type) {
            20
        } else {
            0
        };
        let damage = attack.damage + bonus + weakness_bonus;
        defender.take_damage(damage);
        info!(
            attack = attack.name,
            damage,
            defender = defender.name(),
            "attack resolved"
        );
        if !defender.is_knocked_out() && target.slot == Slot::Active {
            // Status riders only stick to the active slot.
            match attack.effect {
                AttackEffect::None => {}
                AttackEffect::Paralyze => defender.status = Status::Paralyzed,
                AttackEffect::Poison => defender.status = Status::Poisoned,
                AttackEffect::Sleep => defender.status = Status::Asleep,
            }
        }
        defender.is_knocked_out()
    };

    if knocked_out && target.slot == Slot::Active {
        knock_out_active(state, target.player)?;
    }
    Ok(())
}

/// Removes a knocked-out active creature, scores points, and raises the
/// terminal signal when the match ends (point threshold or empty bench).
pub fn knock_out_active(state: &mut MatchState, victim: PlayerId) -> Result<(), MatchOver> {
    let Some(creature) = state.player_mut(victim).active.take() else {
        return Ok(());
    };
    let elite = creature.base.elite;
    let name = creature.name();
    state.player_mut(victim).discard.push(creature.into_card());

    let scorer = victim.opponent();
    let award = if elite { 2 } else { 1 };
    state.player_mut(scorer).points += award;
    info!(
        creature = name,
        scorer = %state.player(scorer).name,
        points = state.player(scorer).points,
        "knockout"
    );

    if state.player(scorer).points >= state.config.points_to_win {
        return Err(MatchOver::won_by(scorer));
    }
    if state.player(victim).bench.is_empty() {
        return Err(MatchOver::won_by(scorer));
    }
    Ok(())
}

/// End-of-turn bookkeeping: poison ticks, status recovery for the player
/// whose turn is ending, buff and pending-energy expiry.
pub fn end_of_turn_upkeep(
    state: &mut MatchState,
    rng: &mut impl Rng,
) -> Result<(), MatchOver> {
    // Poison damages both actives between turns.
    for seat in [state.active, state.active.opponent()] {
        let poison_ko = {
            let player = state.player_mut(seat);
            match player.active.as_mut() {
                Some(active) if active.status == Status::Poisoned => {
                    active.take_damage(10);
                    debug!(creature = active.name(), "poison tick");
                    active.is_knocked_out()
                }
                _ => false,
            }
        };
        if poison_ko {
            knock_out_active(state, seat)?;
        }
    }

    // The ending player's active shakes off paralysis and may wake up.
    let player = state.active_player_mut();
    if let Some(active) = player.active.as_mut() {
        match active.status {
            Status::Paralyzed => active.status = Status::Normal,
            Status::Asleep => {
                if rng.random_bool(0.5) {
                    active.status = Status::Normal;
                }
            }
            _ => {}
        }
    }
    player.buffs.reset();
    player.pending_energy = None;
    Ok(())
}
