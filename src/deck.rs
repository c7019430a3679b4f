//! Ordered deck with draw-from-front semantics.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::card::Card;

/// A player's deck. Cards are drawn from the front; returned cards go to
/// the back.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draws the top card. Empty-deck draws are the caller's silent no-op.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Puts a card on the bottom of the deck.
    pub fn return_to_bottom(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        let mut cards: Vec<Card> = std::mem::take(&mut self.cards).into();
        cards.shuffle(rng);
        self.cards = cards.into();
    }

    /// Removes the first basic creature from the deck, then shuffles.
    /// Returns None (without shuffling) when the deck holds no basic.
    pub fn take_first_basic(&mut self, rng: &mut impl Rng) -> Option<Card> {
        let pos = self.cards.iter().position(|c| c.is_basic_creature())?;
        let card = self.cards.remove(pos);
        self.shuffle(rng);
        card
    }

    pub fn contains_basic(&self) -> bool {
        self.cards.iter().any(|c| c.is_basic_creature())
    }

    /// Reshuffles until the top `hand` cards contain at least one basic
    /// creature, so the opening hand can always field an active creature.
    ///
    /// Returns false if the deck holds no basic creature at all.
    pub fn shuffle_for_opening(&mut self, hand: usize, rng: &mut impl Rng) -> bool {
        if !self.contains_basic() {
            return false;
        }
        loop {
            self.shuffle(rng);
            if self
                .cards
                .iter()
                .take(hand)
                .any(|c| c.is_basic_creature())
            {
                return true;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_deck() -> Deck {
        Deck::new(vec![
            cards::make("Tonic").unwrap(),
            cards::make("Sproutle").unwrap(),
            cards::make("FieldMedic").unwrap(),
        ])
    }

    #[test]
    fn test_draw_from_front_in_order() {
        let mut deck = small_deck();
        assert_eq!(deck.draw().unwrap().name, "Tonic");
        assert_eq!(deck.draw().unwrap().name, "Sproutle");
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_empty_draw_is_none() {
        let mut deck = Deck::new(vec![]);
        assert!(deck.draw().is_none());
    }

    #[test]
    fn test_take_first_basic_removes_and_keeps_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = small_deck();
        let card = deck.take_first_basic(&mut rng).unwrap();
        assert_eq!(card.name, "Sproutle");
        assert_eq!(deck.len(), 2);
        assert!(deck.take_first_basic(&mut rng).is_none());
    }

    #[test]
    fn test_shuffle_for_opening_guarantees_basic() {
        let mut rng = StdRng::seed_from_u64(7);
        let list = cards::grass_deck();
        let mut deck = Deck::new(list.cards);
        assert!(deck.shuffle_for_opening(5, &mut rng));
        assert!(deck.iter().take(5).any(|c| c.is_basic_creature()));
    }

    #[test]
    fn test_shuffle_for_opening_fails_without_basics() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::new(vec![cards::make("Tonic").unwrap()]);
        assert!(!deck.shuffle_for_opening(5, &mut rng));
    }
}
