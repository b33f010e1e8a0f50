//! AI decision engine
//!
//! Evaluate the hand, enumerate candidates, score them and pick with expert
//! randomness: every candidate within 10% of the top score goes into a low
//! temperature softmax draw, so the engine stays strongly biased toward the
//! best move without becoming perfectly predictable. Any fault inside the
//! pipeline falls back to a minimal deterministic legal move; an AI turn never
//! stalls the game.

use rand::Rng;

use crate::domain::{Card, GameState, HandAnalysis};

use super::combo_finder::{find_all_combos, find_beating_combos, Combo, ComboCards};
use super::hand_eval::{evaluate, HandEvaluation};
use super::move_score::{score_move, score_pass, MoveContext, ScoreParams};

/// What the engine chose to do with its turn
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Play(ComboCards),
    Pass,
}

/// Internal faults that trigger the deterministic fallback
#[derive(Debug, thiserror::Error)]
enum EngineFault {
    #[error("asked to move with an empty hand")]
    EmptyHand,
    #[error("no combos found in a non-empty hand")]
    NoCombos,
    #[error("candidate scoring produced a non-finite value")]
    NonFiniteScore,
}

/// Heuristic decision engine with an injectable seeded RNG
pub struct DecisionEngine<R: Rng> {
    params: ScoreParams,
    rng: R,
}

impl<R: Rng> DecisionEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            params: ScoreParams::default(),
            rng,
        }
    }

    pub fn with_params(params: ScoreParams, rng: R) -> Self {
        Self { params, rng }
    }

    /// Decide the move for `seat`. Never fails: pipeline faults are logged and
    /// replaced by the deterministic fallback.
    pub fn decide(&mut self, state: &GameState, seat: usize) -> Decision {
        match self.try_decide(state, seat) {
            Ok(decision) => decision,
            Err(fault) => {
                tracing::warn!(seat, %fault, "AI pipeline fault, using fallback move");
                fallback_move(state, seat)
            }
        }
    }

    fn try_decide(&mut self, state: &GameState, seat: usize) -> Result<Decision, EngineFault> {
        let hand = state.hand(seat);
        if hand.is_empty() {
            return Err(EngineFault::EmptyHand);
        }
        let ctx = MoveContext::from_state(state, seat);
        let before = evaluate(hand);

        // None = pass
        let mut candidates: Vec<(Option<Combo>, f32)> = Vec::new();

        match &ctx.to_beat {
            None => {
                let combos = find_all_combos(hand);
                if combos.is_empty() {
                    return Err(EngineFault::NoCombos);
                }
                for combo in combos {
                    let mut score = self.score_candidate(&combo, hand, &before, &ctx);
                    if combo.analysis.hand_type.is_sequence() {
                        // favor shedding big efficient shapes when opening
                        score += self.params.opening_size_bonus * combo.cards.len() as f32;
                    }
                    candidates.push((Some(combo), score));
                }
            }
            Some(last) => {
                let combos = find_beating_combos(hand, last);
                if combos.is_empty() {
                    return Ok(Decision::Pass);
                }
                let opponent_nearly_out = ctx
                    .opponent_seats()
                    .iter()
                    .any(|&s| ctx.hand_sizes[s] <= 3);
                for combo in combos {
                    let score = self.score_candidate(&combo, hand, &before, &ctx);
                    candidates.push((Some(combo), score));
                }
                // with an opponent about to go out, passing while holding a
                // beating move is never on the table
                if !opponent_nearly_out {
                    candidates.push((None, score_pass(&self.params, &before, &ctx)));
                }
            }
        }

        if candidates.iter().any(|(_, s)| !s.is_finite()) {
            return Err(EngineFault::NonFiniteScore);
        }
        let chosen = self.select(candidates);
        Ok(match chosen {
            Some(combo) => Decision::Play(combo.cards),
            None => Decision::Pass,
        })
    }

    fn score_candidate(
        &self,
        combo: &Combo,
        hand: &[Card],
        before: &HandEvaluation,
        ctx: &MoveContext,
    ) -> f32 {
        let mut rest: Vec<Card> = hand.to_vec();
        for card in &combo.cards {
            if let Some(pos) = rest.iter().position(|c| c == card) {
                rest.remove(pos);
            }
        }
        let after = evaluate(&rest);
        score_move(&self.params, combo, before, &after, ctx)
    }

    /// Keep candidates within the band of the top score, then softmax-sample
    fn select(&mut self, candidates: Vec<(Option<Combo>, f32)>) -> Option<Combo> {
        debug_assert!(!candidates.is_empty());
        let top = candidates
            .iter()
            .map(|(_, s)| *s)
            .fold(f32::NEG_INFINITY, f32::max);
        let floor = top - self.params.selection_band * top.abs() - f32::EPSILON;
        let mut band: Vec<(Option<Combo>, f32)> = candidates
            .into_iter()
            .filter(|(_, s)| *s >= floor)
            .collect();
        tracing::debug!(band = band.len(), top, "selecting among near-optimal candidates");

        if band.len() == 1 {
            return band.remove(0).0;
        }
        let temperature = self.params.softmax_temperature;
        let weights: Vec<f32> = band
            .iter()
            .map(|(_, s)| ((*s - top) / temperature).exp())
            .collect();
        let total: f32 = weights.iter().sum();
        let mut draw = self.rng.gen::<f32>() * total;
        for (i, weight) in weights.iter().enumerate() {
            draw -= weight;
            if draw <= 0.0 {
                return band.swap_remove(i).0;
            }
        }
        band.pop().and_then(|(combo, _)| combo)
    }
}

/// Minimal deterministic legal move: the lowest single when leading, else the
/// weakest beating combo, else pass.
fn fallback_move(state: &GameState, seat: usize) -> Decision {
    let hand = state.hand(seat);
    let to_beat: Option<&HandAnalysis> = state
        .last_play
        .as_ref()
        .filter(|lp| lp.player != seat)
        .map(|lp| &lp.analysis);

    match to_beat {
        None => {
            let lowest = hand
                .iter()
                .min_by_key(|c| (c.power(), c.suit.order()))
                .copied();
            match lowest {
                Some(card) => Decision::Play(ComboCards::from_slice(&[card])),
                None => Decision::Pass,
            }
        }
        Some(last) => {
            let mut beating = find_beating_combos(hand, last);
            beating.sort_by_key(|c| {
                (
                    c.analysis.is_bomb_like(),
                    c.analysis.compare_value(),
                    c.cards.len(),
                )
            });
            match beating.into_iter().next() {
                Some(combo) => Decision::Play(combo.cards),
                None => Decision::Pass,
            }
        }
    }
}
