//! Turn structure: the fixed per-turn phase order and the one-time setup
//! sequence.
//!
//! Every turn walks the same phase list; each phase asks the action catalog
//! for candidates and applies exactly one of them. There is no priority
//! exchange: only the active player acts, except for knockout promotions.

/// The ordered phases of a normal turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Play item cards.
    Item,
    /// Play one support card.
    Support,
    /// Evolve a field creature.
    Evolution,
    /// Deploy basic creatures to the bench.
    Deploy,
    /// Attach the pending energy token.
    EnergyAttach,
    /// Passive abilities fire; no choices in the current card set.
    Ability,
    /// Swap the active creature with a bench creature, paying energy.
    Retreat,
    /// Attack, ending the turn.
    Attack,
}

/// Steps of the one-time setup sequence, run per player before turn 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SetupStep {
    /// Choose the starting active creature (mandatory).
    SelectActive,
    /// Choose which basic creatures start on the bench.
    SelectBench,
}

/// The fixed phase order of a turn.
pub const TURN_PHASES: [Phase; 8] = [
    Phase::Item,
    Phase::Support,
    Phase::Evolution,
    Phase::Deploy,
    Phase::EnergyAttach,
    Phase::Ability,
    Phase::Retreat,
    Phase::Attack,
];

/// Returns the phase after the given one, or None at the end of the turn.
pub fn next_phase(phase: Phase) -> Option<Phase> {
    match phase {
        Phase::Item => Some(Phase::Support),
        Phase::Support => Some(Phase::Evolution),
        Phase::Evolution => Some(Phase::Deploy),
        Phase::Deploy => Some(Phase::EnergyAttach),
        Phase::EnergyAttach => Some(Phase::Ability),
        Phase::Ability => Some(Phase::Retreat),
        Phase::Retreat => Some(Phase::Attack),
        Phase::Attack => None,
    }
}

/// Human-readable phase name for logs and prompts.
pub fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Item => "Item",
        Phase::Support => "Support",
        Phase::Evolution => "Evolution",
        Phase::Deploy => "Deploy",
        Phase::EnergyAttach => "Energy",
        Phase::Ability => "Ability",
        Phase::Retreat => "Retreat",
        Phase::Attack => "Attack",
    }
}
