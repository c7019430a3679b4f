pub mod actions;
pub mod card;
pub mod cards;
pub mod decision;
pub mod deck;
pub mod effects;
pub mod energy;
pub mod game_loop;
pub mod game_state;
pub mod ids;
pub mod mcts;
pub mod player;
pub mod snapshot;
pub mod turn;

#[cfg(test)]
mod tests;

pub use actions::{ActionEffect, Candidate, legal_actions, promotion_actions, setup_actions};
pub use card::{
    Attack, AttackEffect, Card, CardKind, Creature, CreatureCard, CreatureType, ItemEffect,
    Status, SupportEffect,
};
pub use cards::DeckList;
pub use deck::Deck;
pub use decision::{
    ActionSelector, DecisionSource, HeuristicSelector, InteractiveSelector,
    UniformRandomSelector, normalized_score, score_state,
};
pub use effects::{Usability, item_usability, support_usability};
pub use energy::{EnergyCost, EnergyKind, EnergyPool};
pub use game_loop::{
    DecisionContext, DecisionRequest, MatchCursor, MatchEvent, StepError, run_match,
};
pub use game_state::{MatchConfig, MatchOver, MatchState, Outcome};
pub use ids::{CardId, PlayerId};
pub use mcts::{MctsConfig, MctsSelector, SearchReport};
pub use player::{CreatureRef, Player, Slot, TurnBuffs};
pub use snapshot::{CloneError, fork, verify_consistency};
pub use turn::{Phase, SetupStep, TURN_PHASES, next_phase, phase_name};
