//! Demo card registry and prebuilt deck lists.
//!
//! The decision core never inspects these beyond the capability interface;
//! they exist so matches, tests and the CLI have something real to play.

use crate::card::{
    Attack, AttackEffect, Card, CardKind, CreatureCard, CreatureType, ItemEffect, SupportEffect,
};
use crate::energy::{EnergyCost, EnergyKind};
use crate::ids::CardId;

fn sproutle() -> CreatureCard {
    CreatureCard {
        name: "Sproutle",
        max_hp: 70,
        creature_type: CreatureType::Grass,
        weakness: Some(CreatureType::Fire),
        retreat_cost: 1,
        attacks: vec![Attack::new(
            "Vine Lash",
            40,
            EnergyCost::new(&[EnergyKind::Grass], 0),
        )],
        evolves_from: None,
        evolves_into: Some("Thornovine"),
        elite: false,
    }
}

fn thornovine() -> CreatureCard {
    CreatureCard {
        name: "Thornovine",
        max_hp: 110,
        creature_type: CreatureType::Grass,
        weakness: Some(CreatureType::Fire),
        retreat_cost: 3,
        attacks: vec![Attack::new(
            "Verdant Ram",
            70,
            EnergyCost::new(&[EnergyKind::Grass], 2),
        )],
        evolves_from: Some("Sproutle"),
        evolves_into: None,
        elite: false,
    }
}

fn sparkit() -> CreatureCard {
    CreatureCard {
        name: "Sparkit",
        max_hp: 60,
        creature_type: CreatureType::Lightning,
        weakness: Some(CreatureType::Fighting),
        retreat_cost: 1,
        attacks: vec![Attack::new(
            "Jolt",
            20,
            EnergyCost::new(&[EnergyKind::Lightning], 0),
        )],
        evolves_from: None,
        evolves_into: Some("Voltadon"),
        elite: false,
    }
}

fn voltadon() -> CreatureCard {
    CreatureCard {
        name: "Voltadon",
        max_hp: 100,
        creature_type: CreatureType::Lightning,
        weakness: Some(CreatureType::Fighting),
        retreat_cost: 2,
        attacks: vec![
            Attack::new(
                "Storm Fang",
                60,
                EnergyCost::new(&[EnergyKind::Lightning, EnergyKind::Lightning], 0),
            )
            .with_effect(AttackEffect::Paralyze),
        ],
        evolves_from: Some("Sparkit"),
        evolves_into: None,
        elite: false,
    }
}

fn mirelurk() -> CreatureCard {
    CreatureCard {
        name: "Mirelurk",
        max_hp: 90,
        creature_type: CreatureType::Grass,
        weakness: Some(CreatureType::Fire),
        retreat_cost: 2,
        attacks: vec![
            Attack::new(
                "Spore Burst",
                30,
                EnergyCost::new(&[EnergyKind::Grass], 0),
            )
            .with_effect(AttackEffect::Poison),
        ],
        evolves_from: None,
        evolves_into: None,
        elite: false,
    }
}

fn emberyx() -> CreatureCard {
    CreatureCard {
        name: "Emberyx",
        max_hp: 130,
        creature_type: CreatureType::Fire,
        weakness: Some(CreatureType::Water),
        retreat_cost: 2,
        attacks: vec![
            Attack::new(
                "Cinder Claw",
                50,
                EnergyCost::new(&[EnergyKind::Fire], 1),
            ),
            Attack::new(
                "Pyre Wave",
                90,
                EnergyCost::new(&[EnergyKind::Fire, EnergyKind::Fire], 2),
            ),
        ],
        evolves_from: None,
        evolves_into: None,
        elite: true,
    }
}

fn dozeling() -> CreatureCard {
    CreatureCard {
        name: "Dozeling",
        max_hp: 70,
        creature_type: CreatureType::Psychic,
        weakness: Some(CreatureType::Darkness),
        retreat_cost: 1,
        attacks: vec![
            Attack::new("Lull", 10, EnergyCost::new(&[], 1)).with_effect(AttackEffect::Sleep),
        ],
        evolves_from: None,
        evolves_into: None,
        elite: false,
    }
}

/// Builds a fresh copy (new instance ID) of the named card.
pub fn make(name: &str) -> Option<Card> {
    let (name, kind): (&'static str, CardKind) = match name {
        "Sproutle" => ("Sproutle", CardKind::Creature(sproutle())),
        "Thornovine" => ("Thornovine", CardKind::Creature(thornovine())),
        "Sparkit" => ("Sparkit", CardKind::Creature(sparkit())),
        "Voltadon" => ("Voltadon", CardKind::Creature(voltadon())),
        "Mirelurk" => ("Mirelurk", CardKind::Creature(mirelurk())),
        "Emberyx" => ("Emberyx", CardKind::Creature(emberyx())),
        "Dozeling" => ("Dozeling", CardKind::Creature(dozeling())),
        "Tonic" => ("Tonic", CardKind::Item(ItemEffect::Heal(20))),
        "LureOrb" => ("LureOrb", CardKind::Item(ItemEffect::FetchBasic)),
        "SwiftBoots" => ("SwiftBoots", CardKind::Item(ItemEffect::MoveDiscount(1))),
        "FieldMedic" => ("FieldMedic", CardKind::Support(SupportEffect::DrawCards(2))),
        "Drillmaster" => ("Drillmaster", CardKind::Support(SupportEffect::AttackBonus(10))),
        "Smokescreen" => ("Smokescreen", CardKind::Support(SupportEffect::MoveDiscount(2))),
        "HypnoCall" => ("HypnoCall", CardKind::Support(SupportEffect::SwitchOpponent)),
        _ => return None,
    };
    Some(Card {
        id: CardId::new(),
        name,
        kind,
    })
}

/// A deck list: twenty cards plus the energy kinds the deck generates.
pub struct DeckList {
    pub cards: Vec<Card>,
    pub energy_kinds: Vec<EnergyKind>,
}

fn build(names: &[&str], energy_kinds: Vec<EnergyKind>) -> DeckList {
    let cards = names
        .iter()
        .map(|n| make(n).expect("unknown card name in deck list"))
        .collect();
    DeckList {
        cards,
        energy_kinds,
    }
}

/// Grass-leaning starter deck.
pub fn grass_deck() -> DeckList {
    build(
        &[
            "Sproutle",
            "Sproutle",
            "Thornovine",
            "Thornovine",
            "Mirelurk",
            "Mirelurk",
            "Emberyx",
            "Emberyx",
            "Dozeling",
            "Dozeling",
            "Tonic",
            "Tonic",
            "LureOrb",
            "LureOrb",
            "SwiftBoots",
            "FieldMedic",
            "FieldMedic",
            "Drillmaster",
            "Smokescreen",
            "HypnoCall",
        ],
        vec![EnergyKind::Grass, EnergyKind::Fire],
    )
}

/// Lightning-leaning starter deck.
pub fn lightning_deck() -> DeckList {
    build(
        &[
            "Sparkit",
            "Sparkit",
            "Voltadon",
            "Voltadon",
            "Dozeling",
            "Dozeling",
            "Emberyx",
            "Emberyx",
            "Mirelurk",
            "Mirelurk",
            "Tonic",
            "Tonic",
            "LureOrb",
            "LureOrb",
            "SwiftBoots",
            "FieldMedic",
            "FieldMedic",
            "Drillmaster",
            "Smokescreen",
            "HypnoCall",
        ],
        vec![EnergyKind::Lightning, EnergyKind::Fire],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_lists_have_twenty_cards() {
        assert_eq!(grass_deck().cards.len(), 20);
        assert_eq!(lightning_deck().cards.len(), 20);
    }

    #[test]
    fn test_copies_get_distinct_ids() {
        let a = make("Sproutle").unwrap();
        let b = make("Sproutle").unwrap();
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_evolution_links_resolve() {
        let base = make("Sproutle").unwrap();
        let evo = make("Thornovine").unwrap();
        assert_eq!(
            base.as_creature().unwrap().evolves_into,
            Some(evo.name)
        );
        assert_eq!(
            evo.as_creature().unwrap().evolves_from,
            Some(base.name)
        );
        assert!(!evo.is_basic_creature());
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(make("Missingno").is_none());
    }

    #[test]
    fn test_every_deck_has_basic_creatures() {
        for list in [grass_deck(), lightning_deck()] {
            assert!(list.cards.iter().any(|c| c.is_basic_creature()));
        }
    }
}
