//! Match state: both players, the turn counter, and the terminal outcome.

use crate::ids::PlayerId;
use crate::player::Player;

/// Terminal result of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    #[default]
    InProgress,
    Winner(PlayerId),
    Draw,
}

impl Outcome {
    pub fn is_finished(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn winner(self) -> Option<PlayerId> {
        match self {
            Outcome::Winner(p) => Some(p),
            _ => None,
        }
    }
}

/// The match-terminated signal.
///
/// This is expected control flow, not a failure: it carries the winner (or
/// none for a draw) and unwinds the phase loop to whoever started the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOver {
    pub winner: Option<PlayerId>,
}

impl MatchOver {
    pub fn won_by(winner: PlayerId) -> Self {
        Self {
            winner: Some(winner),
        }
    }

    pub fn drawn() -> Self {
        Self { winner: None }
    }

    pub fn outcome(self) -> Outcome {
        match self.winner {
            Some(p) => Outcome::Winner(p),
            None => Outcome::Draw,
        }
    }
}

/// Fixed rules parameters for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    /// Maximum number of bench creatures per player.
    pub bench_capacity: usize,
    /// Points needed to win.
    pub points_to_win: u32,
    /// Turn-count ceiling; reaching it declares a draw.
    pub turn_limit: u32,
    /// Opening hand size.
    pub opening_hand: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            bench_capacity: 3,
            points_to_win: 3,
            turn_limit: 100,
            opening_hand: 5,
        }
    }
}

/// The full mutable state of one match.
///
/// Exactly one of the two players is active at any time; they swap at turn
/// end. Once `outcome` is terminal the state is no longer mutated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct MatchState {
    pub config: MatchConfig,
    /// Turn counter; 0 until the first turn starts.
    pub turn: u32,
    pub players: [Player; 2],
    /// Seat of the active player.
    pub active: PlayerId,
    pub outcome: Outcome,
}

impl MatchState {
    pub fn new(player0: Player, player1: Player, config: MatchConfig) -> Self {
        Self {
            config,
            turn: 0,
            players: [player0, player1],
            active: PlayerId::from_index(0),
            outcome: Outcome::InProgress,
        }
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    pub fn active_player(&self) -> &Player {
        self.player(self.active)
    }

    pub fn active_player_mut(&mut self) -> &mut Player {
        self.player_mut(self.active)
    }

    pub fn waiting_player(&self) -> &Player {
        self.player(self.active.opponent())
    }

    pub fn swap_active(&mut self) {
        self.active = self.active.opponent();
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    /// Attacking is impossible on the first turn.
    pub fn can_attack(&self) -> bool {
        self.turn > 1
    }

    /// Evolution unlocks on turn three.
    pub fn can_evolve(&self) -> bool {
        self.turn > 2
    }
}
