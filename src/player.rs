//! Player state: zones, points, pending energy, and per-turn buffs.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::card::{Card, CardKind, Creature};
use crate::cards::DeckList;
use crate::deck::Deck;
use crate::energy::EnergyKind;
use crate::ids::{CardId, PlayerId};

/// Where a creature in play sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    Active,
    Bench(usize),
}

/// Reference to a creature in play, by owner and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureRef {
    pub player: PlayerId,
    pub slot: Slot,
}

impl CreatureRef {
    pub fn new(player: PlayerId, slot: Slot) -> Self {
        Self { player, slot }
    }
}

/// Transient per-turn bonuses; reset when the owner's turn ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnBuffs {
    /// Flat damage added to this player's attacks.
    pub attack_bonus: u32,
    /// Reduction applied to retreat costs.
    pub move_discount: u32,
}

impl TurnBuffs {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One seat in a match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub deck: Deck,
    /// Hand, partitioned by card kind.
    pub hand_creatures: Vec<Card>,
    pub hand_items: Vec<Card>,
    pub hand_supports: Vec<Card>,
    pub active: Option<Creature>,
    pub bench: Vec<Creature>,
    pub discard: Vec<Card>,
    /// Points scored from knockouts.
    pub points: u32,
    /// The energy token granted this turn, if not yet attached (0 or 1).
    pub pending_energy: Option<EnergyKind>,
    /// Energy kinds this player's deck generates.
    pub energy_kinds: Vec<EnergyKind>,
    pub buffs: TurnBuffs,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, list: DeckList) -> Self {
        Self {
            id,
            name: name.into(),
            deck: Deck::new(list.cards),
            hand_creatures: Vec::new(),
            hand_items: Vec::new(),
            hand_supports: Vec::new(),
            active: None,
            bench: Vec::new(),
            discard: Vec::new(),
            points: 0,
            pending_energy: None,
            energy_kinds: list.energy_kinds,
            buffs: TurnBuffs::default(),
        }
    }

    /// Draws `count` cards into the partitioned hand. Drawing from an empty
    /// deck is a silent no-op.
    pub fn draw(&mut self, count: usize) {
        for _ in 0..count {
            let Some(card) = self.deck.draw() else {
                debug!(player = %self.name, "deck is empty, draw skipped");
                return;
            };
            self.put_in_hand(card);
        }
    }

    pub fn put_in_hand(&mut self, card: Card) {
        match card.kind {
            CardKind::Creature(_) => self.hand_creatures.push(card),
            CardKind::Item(_) => self.hand_items.push(card),
            CardKind::Support(_) => self.hand_supports.push(card),
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand_creatures.len() + self.hand_items.len() + self.hand_supports.len()
    }

    /// Grants this turn's energy token, drawn uniformly from the deck's
    /// declared kinds.
    pub fn gain_energy(&mut self, rng: &mut impl Rng) {
        self.pending_energy = self.energy_kinds.choose(rng).copied();
    }

    pub fn creature_at(&self, slot: Slot) -> Option<&Creature> {
        match slot {
            Slot::Active => self.active.as_ref(),
            Slot::Bench(i) => self.bench.get(i),
        }
    }

    pub fn creature_at_mut(&mut self, slot: Slot) -> Option<&mut Creature> {
        match slot {
            Slot::Active => self.active.as_mut(),
            Slot::Bench(i) => self.bench.get_mut(i),
        }
    }

    /// Occupied slots, active first.
    pub fn field_slots(&self) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(1 + self.bench.len());
        if self.active.is_some() {
            slots.push(Slot::Active);
        }
        for i in 0..self.bench.len() {
            slots.push(Slot::Bench(i));
        }
        slots
    }

    /// Total energy attached across active and bench.
    pub fn attached_energy_total(&self) -> u32 {
        self.active.iter().map(|c| c.energy.total()).sum::<u32>()
            + self.bench.iter().map(|c| c.energy.total()).sum::<u32>()
    }

    /// Removes a card from whichever hand partition holds it.
    pub fn take_from_hand(&mut self, id: CardId) -> Option<Card> {
        for hand in [
            &mut self.hand_creatures,
            &mut self.hand_items,
            &mut self.hand_supports,
        ] {
            if let Some(pos) = hand.iter().position(|c| c.id == id) {
                return Some(hand.remove(pos));
            }
        }
        None
    }

    /// Moves the bench creature at `index` into the empty active slot.
    pub fn promote_from_bench(&mut self, index: usize) -> bool {
        if self.active.is_some() || index >= self.bench.len() {
            return false;
        }
        self.active = Some(self.bench.remove(index));
        true
    }

    /// Multiset of card IDs across every zone this player owns.
    ///
    /// The multiset is invariant for the whole match: cards move between
    /// zones but are never created or destroyed.
    pub fn card_multiset(&self) -> HashMap<CardId, usize> {
        let mut counts = HashMap::new();
        let ids = self
            .deck
            .iter()
            .map(|c| c.id)
            .chain(self.hand_creatures.iter().map(|c| c.id))
            .chain(self.hand_items.iter().map(|c| c.id))
            .chain(self.hand_supports.iter().map(|c| c.id))
            .chain(self.discard.iter().map(|c| c.id))
            .chain(self.active.iter().map(|c| c.id))
            .chain(self.bench.iter().map(|c| c.id));
        for id in ids {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }
}
