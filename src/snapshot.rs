//! State cloning for simulation.
//!
//! `MatchState` owns every byte of its data (no shared pointers), so a
//! `clone()` is already a value-independent deep copy, and search trees
//! and selectors live outside the state entirely, so there is nothing
//! transient to strip before cloning. `fork` adds the paranoia the search
//! loop wants: it verifies the copy is value-equal and conserves each
//! player's card multiset before handing it to a simulation, because a
//! corrupted clone silently poisons every statistic derived from it.

use crate::game_loop::MatchCursor;
use crate::game_state::MatchState;
use crate::ids::PlayerId;

/// Fatal clone-consistency defects. A simulation must abort rather than
/// continue on a state that fails these checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneError {
    /// The copy is not value-equal to the original.
    StateMismatch,
    /// A player's card multiset differs between copy and original.
    CardConservation { player: PlayerId },
}

/// Verifies that `copy` is a faithful deep copy of `original`.
pub fn verify_consistency(original: &MatchState, copy: &MatchState) -> Result<(), CloneError> {
    for (a, b) in original.players.iter().zip(copy.players.iter()) {
        if a.card_multiset() != b.card_multiset() {
            return Err(CloneError::CardConservation { player: a.id });
        }
    }
    if original != copy {
        return Err(CloneError::StateMismatch);
    }
    Ok(())
}

/// Produces an isolated copy of a mid-decision cursor for simulation.
pub fn fork(cursor: &MatchCursor) -> Result<MatchCursor, CloneError> {
    let copy = cursor.clone();
    verify_consistency(cursor.state(), copy.state())?;
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Creature;
    use crate::cards;
    use crate::energy::EnergyKind;
    use crate::game_state::MatchConfig;
    use crate::player::Player;

    fn test_state() -> MatchState {
        let mut state = MatchState::new(
            Player::new(PlayerId::from_index(0), "Alice", cards::grass_deck()),
            Player::new(PlayerId::from_index(1), "Bob", cards::lightning_deck()),
            MatchConfig::default(),
        );
        for player in &mut state.players {
            player.draw(5);
            if let Some(pos) = player
                .hand_creatures
                .iter()
                .position(|c| c.is_basic_creature())
            {
                let card = player.hand_creatures.remove(pos);
                player.active = Creature::from_card(&card);
            }
        }
        state
    }

    #[test]
    fn test_clone_is_value_equal() {
        let state = test_state();
        let copy = state.clone();
        assert_eq!(state, copy);
        assert!(verify_consistency(&state, &copy).is_ok());
    }

    #[test]
    fn test_clone_mutation_does_not_alias_original() {
        let state = test_state();
        let mut copy = state.clone();

        // Attach energy to the clone's active creature.
        if let Some(active) = copy.players[0].active.as_mut() {
            active.energy.attach(EnergyKind::Grass);
        }
        let original_count = state.players[0]
            .active
            .as_ref()
            .map(|c| c.energy.total())
            .unwrap_or(0);
        let copy_count = copy.players[0]
            .active
            .as_ref()
            .map(|c| c.energy.total())
            .unwrap_or(0);
        assert_eq!(original_count, 0);
        assert_eq!(copy_count, 1);

        // Damage in the clone stays in the clone.
        copy.players[1].active.as_mut().unwrap().take_damage(30);
        assert!(!state.players[1].active.as_ref().unwrap().is_damaged());
    }

    #[test]
    fn test_verify_detects_lost_card() {
        let state = test_state();
        let mut copy = state.clone();
        copy.players[0].discard.clear();
        copy.players[0].deck = crate::deck::Deck::new(vec![]);
        assert_eq!(
            verify_consistency(&state, &copy),
            Err(CloneError::CardConservation {
                player: PlayerId::from_index(0)
            })
        );
    }

    #[test]
    fn test_verify_detects_value_drift() {
        let state = test_state();
        let mut copy = state.clone();
        copy.turn += 1;
        assert_eq!(
            verify_consistency(&state, &copy),
            Err(CloneError::StateMismatch)
        );
    }
}
