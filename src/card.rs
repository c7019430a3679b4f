//! Card definitions and the live creature instances built from them.
//!
//! A `Card` is a physical copy with a stable `CardId`; its `CardKind` says
//! whether it is a creature, an item, or a support card. Creatures in play
//! are `Creature` instances that keep the originating card so it can return
//! to the discard pile on knockout, preserving card conservation.

use crate::energy::{EnergyCost, EnergyPool};
use crate::ids::CardId;

/// Creature elemental type; also used as a weakness tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureType {
    Normal,
    Grass,
    Fire,
    Water,
    Lightning,
    Psychic,
    Fighting,
    Darkness,
    Metal,
    Dragon,
}

/// Condition of a creature in the active slot.
///
/// Bench creatures are always `Normal`; moving to the bench clears status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    #[default]
    Normal,
    Asleep,
    Paralyzed,
    Poisoned,
}

impl Status {
    /// Asleep and paralyzed creatures can neither attack nor retreat.
    pub fn blocks_acting(self) -> bool {
        matches!(self, Status::Asleep | Status::Paralyzed)
    }
}

/// Extra effect an attack applies to the defender on hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackEffect {
    #[default]
    None,
    Paralyze,
    Poison,
    Sleep,
}

/// One attack line on a creature card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Attack {
    pub name: &'static str,
    pub damage: u32,
    pub cost: EnergyCost,
    pub effect: AttackEffect,
}

impl Attack {
    pub fn new(name: &'static str, damage: u32, cost: EnergyCost) -> Self {
        Self {
            name,
            damage,
            cost,
            effect: AttackEffect::None,
        }
    }

    pub fn with_effect(mut self, effect: AttackEffect) -> Self {
        self.effect = effect;
        self
    }
}

/// Static definition of a creature card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct CreatureCard {
    pub name: &'static str,
    pub max_hp: u32,
    pub creature_type: CreatureType,
    pub weakness: Option<CreatureType>,
    pub retreat_cost: u32,
    pub attacks: Vec<Attack>,
    /// Name of the creature this one evolves from, if any.
    pub evolves_from: Option<&'static str>,
    /// Name of the creature this one evolves into, if any.
    pub evolves_into: Option<&'static str>,
    /// Elite creatures award two points when knocked out.
    pub elite: bool,
}

impl CreatureCard {
    /// Basic creatures can be played from hand; evolutions cannot.
    pub fn is_basic(&self) -> bool {
        self.evolves_from.is_none()
    }
}

/// Effect tag of an item card, dispatched in `effects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    /// Heal the target creature for the given amount.
    Heal(u32),
    /// Move the first basic creature from the deck to hand, then shuffle.
    FetchBasic,
    /// Reduce retreat costs this turn.
    MoveDiscount(u32),
}

/// Effect tag of a support card, dispatched in `effects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SupportEffect {
    /// Draw cards.
    DrawCards(u32),
    /// Flat attack bonus this turn.
    AttackBonus(u32),
    /// Reduce retreat costs this turn.
    MoveDiscount(u32),
    /// Swap the opponent's active creature with a bench creature of the
    /// acting player's choosing.
    SwitchOpponent,
}

/// What a card is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub enum CardKind {
    Creature(CreatureCard),
    Item(ItemEffect),
    Support(SupportEffect),
}

/// A physical card copy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Card {
    pub id: CardId,
    pub name: &'static str,
    pub kind: CardKind,
}

impl Card {
    pub fn is_creature(&self) -> bool {
        matches!(self.kind, CardKind::Creature(_))
    }

    pub fn is_basic_creature(&self) -> bool {
        matches!(&self.kind, CardKind::Creature(c) if c.is_basic())
    }

    pub fn as_creature(&self) -> Option<&CreatureCard> {
        match &self.kind {
            CardKind::Creature(c) => Some(c),
            _ => None,
        }
    }
}

/// A creature in play (active slot or bench).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Creature {
    pub id: CardId,
    pub base: CreatureCard,
    pub hp: u32,
    pub energy: EnergyPool,
    pub status: Status,
}

impl Creature {
    /// Puts a creature card into play. Returns None for non-creature cards.
    pub fn from_card(card: &Card) -> Option<Self> {
        let base = card.as_creature()?.clone();
        Some(Self {
            id: card.id,
            hp: base.max_hp,
            base,
            energy: EnergyPool::new(),
            status: Status::Normal,
        })
    }

    /// Rebuilds the physical card, e.g. for the discard pile on knockout.
    /// Attached energy is a token resource and simply dissipates.
    pub fn into_card(self) -> Card {
        Card {
            id: self.id,
            name: self.base.name,
            kind: CardKind::Creature(self.base),
        }
    }

    pub fn name(&self) -> &'static str {
        self.base.name
    }

    pub fn damage_taken(&self) -> u32 {
        self.base.max_hp - self.hp
    }

    pub fn is_damaged(&self) -> bool {
        self.hp < self.base.max_hp
    }

    pub fn is_knocked_out(&self) -> bool {
        self.hp == 0
    }

    /// Applies damage, saturating at zero HP.
    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Heals up to `amount`, capped at max HP.
    pub fn heal(&mut self, amount: u32) {
        self.hp = (self.hp + amount).min(self.base.max_hp);
    }

    /// Indices of attacks whose cost the attached energy satisfies.
    pub fn usable_attacks(&self) -> Vec<usize> {
        self.base
            .attacks
            .iter()
            .enumerate()
            .filter(|(_, a)| a.cost.payable_by(&self.energy))
            .map(|(i, _)| i)
            .collect()
    }

    /// Effective retreat cost after the owner's movement discount.
    pub fn retreat_cost_with(&self, discount: u32) -> u32 {
        self.base.retreat_cost.saturating_sub(discount)
    }

    /// Whether this creature may retreat given the owner's discount.
    pub fn can_retreat(&self, discount: u32) -> bool {
        !self.status.blocks_acting()
            && self.energy.total() >= self.retreat_cost_with(discount)
    }
}
