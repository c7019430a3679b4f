//! The phase sequencer: a pull-based state machine that drives a match.
//!
//! `MatchCursor` advances through setup, phases and turn bookkeeping on its
//! own, auto-applying every singleton candidate set, and only surfaces a
//! `DecisionRequest` when a real choice (two or more candidates) exists.
//! The caller answers with `resume(index)`. Because the cursor is plain
//! data it can be cloned mid-decision, which is exactly what simulation
//! needs; a live coroutine could not be.
//!
//! The singleton rule is enforced here, never in selectors: a selector is
//! never invoked for a one-candidate decision.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::actions::{self, Candidate};
use crate::decision::ActionSelector;
use crate::effects;
use crate::game_state::{MatchOver, MatchState, Outcome};
use crate::ids::PlayerId;
use crate::turn::{Phase, SetupStep, next_phase, phase_name};

/// Why a decision is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub enum DecisionContext {
    Setup(SetupStep),
    Phase(Phase),
    /// Mandatory bench promotion after a knockout.
    Promotion,
}

/// A decision point surfaced by the sequencer: the named player must pick
/// one of the candidates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct DecisionRequest {
    pub player: PlayerId,
    pub context: DecisionContext,
    pub candidates: Vec<Candidate>,
}

/// What `advance` produced: either a decision to answer or the final
/// outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    Decision(DecisionRequest),
    Finished(Outcome),
}

/// Errors from answering a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The selector returned an out-of-range index. Interactive sources
    /// re-prompt; for programmatic selectors this is a defect.
    InvalidActionIndex { index: usize, len: usize },
    /// `resume` was called with no decision outstanding.
    NoPendingDecision,
}

/// Cursor position within the match flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
enum Pos {
    /// One-time setup; seat 0 is whoever won the coin toss.
    Setup { seat: u8, step: SetupStep },
    /// Turn start bookkeeping: counter, draw, energy grant.
    StartTurn,
    InTurn(Phase),
    /// End-of-turn upkeep: status ticks, buff expiry.
    EndTurn,
    /// Hand the turn to the other player (after any promotions resolved).
    TurnSwap,
}

/// The phase sequencer over one match.
#[derive(Debug, Clone)]
pub struct MatchCursor {
    state: MatchState,
    pos: Pos,
    /// Players owing a bench promotion, in knockout order.
    promotions: VecDeque<PlayerId>,
    /// The decision currently awaiting an answer.
    awaiting: Option<DecisionRequest>,
}

impl MatchCursor {
    /// Starts a match: coin toss for first player, opening shuffles and
    /// draws, then the setup sequence.
    pub fn new(mut state: MatchState, rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            state.swap_active();
        }
        let hand = state.config.opening_hand;
        for player in &mut state.players {
            player.deck.shuffle_for_opening(hand, rng);
            player.draw(hand);
        }
        info!(first = %state.active_player().name, "match started");
        Self {
            state,
            pos: Pos::Setup {
                seat: 0,
                step: SetupStep::SelectActive,
            },
            promotions: VecDeque::new(),
            awaiting: None,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Test-only constructor: a cursor parked at the given phase of a
    /// hand-built mid-match state.
    #[cfg(test)]
    pub(crate) fn test_harness(state: MatchState, phase: Phase) -> Self {
        Self {
            state,
            pos: Pos::InTurn(phase),
            promotions: VecDeque::new(),
            awaiting: None,
        }
    }

    /// The decision currently awaiting an answer, if any.
    pub fn awaiting(&self) -> Option<&DecisionRequest> {
        self.awaiting.as_ref()
    }

    /// Drives the match forward until a real decision or the end.
    ///
    /// Idempotent while a decision is outstanding: calling `advance` again
    /// re-emits the same request.
    pub fn advance(&mut self, rng: &mut impl Rng) -> MatchEvent {
        loop {
            if self.state.is_finished() {
                return MatchEvent::Finished(self.state.outcome);
            }
            if let Some(request) = &self.awaiting {
                return MatchEvent::Decision(request.clone());
            }

            // Knockout promotions preempt everything else.
            self.queue_knockout_promotions();
            if let Some(&victim) = self.promotions.front() {
                let candidates = actions::promotion_actions(&self.state, victim);
                if candidates.is_empty() {
                    // Bench exhausted; normally caught at knockout time.
                    self.finish(MatchOver::won_by(victim.opponent()));
                    continue;
                }
                self.offer(victim, DecisionContext::Promotion, candidates, rng);
                continue;
            }

            match self.pos {
                Pos::Setup { seat, step } => {
                    let player = self.seat_player(seat);
                    let candidates = actions::setup_actions(&self.state, player, step);
                    self.offer(player, DecisionContext::Setup(step), candidates, rng);
                }
                Pos::StartTurn => {
                    self.state.turn += 1;
                    if self.state.turn > self.state.config.turn_limit {
                        info!(
                            limit = self.state.config.turn_limit,
                            "turn limit reached, match drawn"
                        );
                        self.finish(MatchOver::drawn());
                        continue;
                    }
                    self.state.active_player_mut().draw(1);
                    if self.state.turn > 1 {
                        self.state.active_player_mut().gain_energy(rng);
                    }
                    debug!(
                        turn = self.state.turn,
                        player = %self.state.active_player().name,
                        "turn started"
                    );
                    self.pos = Pos::InTurn(Phase::Item);
                }
                Pos::InTurn(phase) => {
                    let player = self.state.active;
                    let candidates = actions::legal_actions(&self.state, phase);
                    self.offer(player, DecisionContext::Phase(phase), candidates, rng);
                }
                Pos::EndTurn => {
                    if let Err(over) = effects::end_of_turn_upkeep(&mut self.state, rng) {
                        self.finish(over);
                        continue;
                    }
                    self.pos = Pos::TurnSwap;
                }
                Pos::TurnSwap => {
                    // Reached only once outstanding promotions are resolved.
                    self.state.swap_active();
                    self.pos = Pos::StartTurn;
                }
            }
        }
    }

    /// Answers the outstanding decision with the chosen candidate index.
    pub fn resume(&mut self, index: usize, rng: &mut impl Rng) -> Result<(), StepError> {
        let Some(request) = self.awaiting.take() else {
            return Err(StepError::NoPendingDecision);
        };
        if index >= request.candidates.len() {
            let len = request.candidates.len();
            // Keep the request outstanding so the caller can re-prompt.
            self.awaiting = Some(request);
            return Err(StepError::InvalidActionIndex { index, len });
        }
        self.apply_candidate(
            request.context,
            request.player,
            &request.candidates[index],
            rng,
        );
        Ok(())
    }

    /// Applies a candidate and steps the position machine; singleton sets
    /// are applied inline without surfacing a decision.
    fn offer(
        &mut self,
        player: PlayerId,
        context: DecisionContext,
        candidates: Vec<Candidate>,
        rng: &mut impl Rng,
    ) {
        if candidates.is_empty() {
            // No legal option at a mandatory selection: the player cannot
            // field a creature and concedes.
            self.finish(MatchOver::won_by(player.opponent()));
        } else if candidates.len() == 1 {
            trace!(?context, "singleton candidate auto-applied");
            self.apply_candidate(context, player, &candidates[0], rng);
        } else {
            self.awaiting = Some(DecisionRequest {
                player,
                context,
                candidates,
            });
        }
    }

    fn apply_candidate(
        &mut self,
        context: DecisionContext,
        player: PlayerId,
        candidate: &Candidate,
        rng: &mut impl Rng,
    ) {
        debug!(
            player = %self.state.player(player).name,
            action = %candidate.description,
            "action applied"
        );
        if let Err(over) = effects::apply(&mut self.state, player, &candidate.effect, rng) {
            self.finish(over);
            return;
        }
        match context {
            DecisionContext::Promotion => {
                self.promotions.pop_front();
            }
            DecisionContext::Setup(step) => self.advance_setup(step),
            DecisionContext::Phase(phase) => {
                self.pos = match next_phase(phase) {
                    Some(next) => Pos::InTurn(next),
                    None => Pos::EndTurn,
                };
                trace!(phase = phase_name(phase), "phase complete");
            }
        }
    }

    fn advance_setup(&mut self, completed: SetupStep) {
        if let Pos::Setup { seat, .. } = self.pos {
            self.pos = match (seat, completed) {
                (s, SetupStep::SelectActive) => Pos::Setup {
                    seat: s,
                    step: SetupStep::SelectBench,
                },
                (0, SetupStep::SelectBench) => Pos::Setup {
                    seat: 1,
                    step: SetupStep::SelectActive,
                },
                (_, SetupStep::SelectBench) => Pos::StartTurn,
            };
        }
    }

    /// Players whose active slot is empty owe a promotion decision.
    fn queue_knockout_promotions(&mut self) {
        if matches!(self.pos, Pos::Setup { .. }) {
            return;
        }
        for seat in [self.state.active, self.state.active.opponent()] {
            if self.state.player(seat).active.is_none() && !self.promotions.contains(&seat) {
                self.promotions.push_back(seat);
            }
        }
    }

    fn seat_player(&self, seat: u8) -> PlayerId {
        // During setup the active seat never changes.
        if seat == 0 {
            self.state.active
        } else {
            self.state.active.opponent()
        }
    }

    fn finish(&mut self, over: MatchOver) {
        self.state.outcome = over.outcome();
        self.awaiting = None;
        self.promotions.clear();
        info!(outcome = ?self.state.outcome, "match finished");
    }
}

/// Runs a match to completion, routing each decision to its player's
/// selector.
///
/// `InvalidActionIndex` from a selector is a programming defect here:
/// interactive selectors validate and re-prompt internally before
/// returning.
pub fn run_match(
    state: MatchState,
    selectors: &mut [&mut dyn ActionSelector; 2],
    rng: &mut impl Rng,
) -> Result<Outcome, StepError> {
    let mut cursor = MatchCursor::new(state, rng);
    loop {
        match cursor.advance(rng) {
            MatchEvent::Finished(outcome) => return Ok(outcome),
            MatchEvent::Decision(request) => {
                let index =
                    selectors[request.player.index()].choose_action(&cursor, &request);
                cursor.resume(index, rng)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Creature;
    use crate::cards::{self, DeckList};
    use crate::game_state::MatchConfig;
    use crate::player::Player;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lone_creature_deck() -> DeckList {
        DeckList {
            cards: vec![cards::make("Sproutle").unwrap()],
            energy_kinds: vec![],
        }
    }

    fn lone_creature_state(turn_limit: u32) -> MatchState {
        MatchState::new(
            Player::new(PlayerId::from_index(0), "Alice", lone_creature_deck()),
            Player::new(PlayerId::from_index(1), "Bob", lone_creature_deck()),
            MatchConfig {
                turn_limit,
                ..MatchConfig::default()
            },
        )
    }

    #[test]
    fn test_stalemate_runs_to_draw_without_any_decision() {
        // One basic creature each, no energy kinds: every catalog in the
        // whole match is a singleton, so advance() runs straight to the
        // turn ceiling without yielding once.
        let mut rng = StdRng::seed_from_u64(11);
        let mut cursor = MatchCursor::new(lone_creature_state(30), &mut rng);
        match cursor.advance(&mut rng) {
            MatchEvent::Finished(outcome) => assert_eq!(outcome, Outcome::Draw),
            MatchEvent::Decision(request) => {
                panic!("unexpected decision: {:?}", request.context)
            }
        }
        assert_eq!(cursor.state().turn, 31);
    }

    #[test]
    fn test_advance_is_idempotent_while_awaiting() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = lone_creature_state(50);
        // A second basic gives the setup bench step a real choice.
        state.players[0]
            .deck
            .return_to_bottom(cards::make("Mirelurk").unwrap());
        let mut cursor = MatchCursor::new(state, &mut rng);
        let first = cursor.advance(&mut rng);
        let second = cursor.advance(&mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resume_rejects_out_of_range_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = lone_creature_state(50);
        state.players[0]
            .deck
            .return_to_bottom(cards::make("Mirelurk").unwrap());
        let mut cursor = MatchCursor::new(state, &mut rng);
        let MatchEvent::Decision(request) = cursor.advance(&mut rng) else {
            panic!("expected a decision");
        };
        let len = request.candidates.len();
        assert_eq!(
            cursor.resume(len + 5, &mut rng),
            Err(StepError::InvalidActionIndex {
                index: len + 5,
                len
            })
        );
        // The decision is still outstanding and answerable.
        assert!(cursor.awaiting().is_some());
        assert_eq!(cursor.resume(0, &mut rng), Ok(()));
    }

    #[test]
    fn test_resume_without_decision_errors() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cursor = MatchCursor::new(lone_creature_state(5), &mut rng);
        let _ = cursor.advance(&mut rng);
        assert_eq!(
            cursor.resume(0, &mut rng),
            Err(StepError::NoPendingDecision)
        );
    }

    #[test]
    fn test_promotion_preempts_turn_flow() {
        let mut rng = StdRng::seed_from_u64(9);
        // A mid-match shape built by hand: Bob's active was knocked out
        // and two bench creatures await promotion.
        let mut state = lone_creature_state(50);
        state.turn = 5;
        state.players[0].active =
            Creature::from_card(&cards::make("Sproutle").unwrap());
        state.players[1].active = None;
        for name in ["Sparkit", "Dozeling"] {
            state.players[1]
                .bench
                .push(Creature::from_card(&cards::make(name).unwrap()).unwrap());
        }
        let mut cursor = MatchCursor {
            state,
            pos: Pos::EndTurn,
            promotions: VecDeque::new(),
            awaiting: None,
        };
        let MatchEvent::Decision(request) = cursor.advance(&mut rng) else {
            panic!("expected promotion decision");
        };
        assert_eq!(request.context, DecisionContext::Promotion);
        assert_eq!(request.player, PlayerId::from_index(1));
        assert_eq!(request.candidates.len(), 2);
        cursor.resume(1, &mut rng).unwrap();
        assert_eq!(
            cursor.state().players[1].active.as_ref().unwrap().name(),
            "Dozeling"
        );
    }
}
