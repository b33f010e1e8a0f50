//! Move scoring - weighted heuristics over a candidate play
//!
//! Six component scores, each independently bounded:
//! 1. structure preservation  -100..=0
//! 2. trash reduction            0..=50
//! 3. initiative value           0..=30
//! 4. control-card discipline  -40..=0
//! 5. exit-plan improvement    -20..=40
//! 6. minimum-margin preference -25..=0
//! The sum is then shaped by a stage multiplier that damps bombs and rockets
//! early and rewards them late. Weights are tuned constants in `ScoreParams`.

use smallvec::SmallVec;

use crate::domain::{GameState, HandAnalysis, CONTROL_POWER, PLAYER_COUNT};

use super::combo_finder::Combo;
use super::hand_eval::HandEvaluation;

/// Coarse game stage from the total cards still held across all seats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    Early,
    Mid,
    Late,
}

impl GameStage {
    pub fn from_remaining(total: usize) -> Self {
        if total >= 12 {
            GameStage::Early
        } else if total >= 6 {
            GameStage::Mid
        } else {
            GameStage::Late
        }
    }
}

/// Game context a single move is scored against
#[derive(Debug, Clone)]
pub struct MoveContext {
    pub seat: usize,
    pub landlord: usize,
    pub last_player: Option<usize>,
    pub hand_sizes: [usize; PLAYER_COUNT],
    /// The analysis on the table, when the scorer does not hold the lead
    pub to_beat: Option<HandAnalysis>,
}

impl MoveContext {
    pub fn from_state(state: &GameState, seat: usize) -> Self {
        MoveContext {
            seat,
            landlord: state.landlord.unwrap_or(0),
            last_player: state.last_play.as_ref().map(|lp| lp.player),
            hand_sizes: state.hand_sizes(),
            to_beat: state
                .last_play
                .as_ref()
                .filter(|lp| lp.player != seat)
                .map(|lp| lp.analysis.clone()),
        }
    }

    pub fn stage(&self) -> GameStage {
        GameStage::from_remaining(self.hand_sizes.iter().sum())
    }

    /// Farmers are teammates of each other; the landlord has none
    pub fn is_teammate(&self, other: usize) -> bool {
        other != self.seat && other != self.landlord && self.seat != self.landlord
    }

    /// Seats playing against the scorer
    pub fn opponent_seats(&self) -> SmallVec<[usize; 2]> {
        (0..PLAYER_COUNT)
            .filter(|&s| s != self.seat && !self.is_teammate(s))
            .collect()
    }
}

/// Heuristic weights. Defaults are hand-tuned against self-play.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    // component 1: structure preservation
    pub core_break_penalty: f32,
    // component 2: trash reduction
    pub trash_shed_bonus: f32,
    // component 3: initiative
    pub initiative_weight: f32,
    pub initiative_floor_power: f32,
    // component 4: control discipline
    pub control_spend_penalty: f32,
    // component 5: exit plan
    pub exit_turn_weight: f32,
    // component 6: minimum margin
    pub margin_step_penalty: f32,

    // opening-size bonus for efficient multi-card lead shapes
    pub opening_size_bonus: f32,

    // stage multipliers applied to bomb and rocket scores
    pub bomb_early_factor: f32,
    pub bomb_mid_factor: f32,
    pub bomb_late_factor: f32,

    // pass scoring
    pub pass_teammate_card_bonus: f32,
    pub pass_trash_bonus: f32,
    pub pass_control_reserve_bonus: f32,
    pub pass_opponent_pressure_penalty: f32,

    // selection
    pub selection_band: f32,
    pub softmax_temperature: f32,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            core_break_penalty: 34.0,
            trash_shed_bonus: 16.0,
            initiative_weight: 4.5,
            initiative_floor_power: 10.0,
            control_spend_penalty: 9.0,
            exit_turn_weight: 22.0,
            margin_step_penalty: 2.5,

            opening_size_bonus: 3.5,

            bomb_early_factor: 0.45,
            bomb_mid_factor: 1.0,
            bomb_late_factor: 1.6,

            pass_teammate_card_bonus: 2.2,
            pass_trash_bonus: 4.0,
            pass_control_reserve_bonus: 5.0,
            pass_opponent_pressure_penalty: 90.0,

            selection_band: 0.10,
            softmax_temperature: 6.0,
        }
    }
}

/// Score a candidate move against the hand before and after playing it
pub fn score_move(
    params: &ScoreParams,
    combo: &Combo,
    before: &HandEvaluation,
    after: &HandEvaluation,
    ctx: &MoveContext,
) -> f32 {
    let raw = structure_preservation(params, combo, before, after)
        + trash_reduction(params, before, after)
        + initiative_value(params, combo)
        + control_discipline(params, combo)
        + exit_improvement(params, before, after)
        + margin_preference(params, combo, ctx);
    raw * stage_factor(params, combo, ctx.stage())
}

/// Score declining to play
pub fn score_pass(params: &ScoreParams, eval: &HandEvaluation, ctx: &MoveContext) -> f32 {
    let mut score = 0.0f32;

    if let Some(last) = ctx.last_player {
        if ctx.is_teammate(last) {
            // leave a teammate's strong position alone, the more cards they
            // still need to shed the more a pass is worth
            let teammate_cards = ctx.hand_sizes[last].min(12) as f32;
            score += params.pass_teammate_card_bonus * teammate_cards;
        }
    }

    let trash = eval.trash_singles.len().min(8) as f32;
    score += params.pass_trash_bonus * trash;

    let controls = eval.control_cards.len().min(5) as f32;
    score += params.pass_control_reserve_bonus * controls;

    for opponent in ctx.opponent_seats() {
        if ctx.hand_sizes[opponent] <= 3 {
            score -= params.pass_opponent_pressure_penalty;
        }
    }
    score
}

/// Component 1, -100..=0: each core damaged but not fully spent is a loss
fn structure_preservation(
    params: &ScoreParams,
    combo: &Combo,
    before: &HandEvaluation,
    after: &HandEvaluation,
) -> f32 {
    let played = crate::domain::power_counts(&combo.cards);
    let mut broken = 0usize;
    for core in &before.cores {
        if after.cores.contains(core) {
            continue;
        }
        let touched: usize = (core.base..core.base + core.length as u8)
            .map(|p| played[p as usize] as usize)
            .sum();
        // a core played out whole was used, not broken
        if touched > 0 && touched < core.card_count() {
            broken += 1;
        }
    }
    (-(broken as f32) * params.core_break_penalty).clamp(-100.0, 0.0)
}

/// Component 2, 0..=50: shedding trash singles is the cheapest progress
fn trash_reduction(params: &ScoreParams, before: &HandEvaluation, after: &HandEvaluation) -> f32 {
    let shed = before.trash_singles.len().saturating_sub(after.trash_singles.len());
    (shed as f32 * params.trash_shed_bonus).clamp(0.0, 50.0)
}

/// Component 3, 0..=30: strong plays tend to keep or take the lead
fn initiative_value(params: &ScoreParams, combo: &Combo) -> f32 {
    if combo.analysis.is_bomb_like() {
        return 30.0;
    }
    let value = combo.analysis.compare_value() as f32;
    ((value - params.initiative_floor_power) * params.initiative_weight).clamp(0.0, 30.0)
}

/// Component 4, -40..=0: control cards are for critical moments
fn control_discipline(params: &ScoreParams, combo: &Combo) -> f32 {
    let spent = combo
        .cards
        .iter()
        .filter(|c| c.power() >= CONTROL_POWER)
        .count();
    (-(spent as f32) * params.control_spend_penalty).clamp(-40.0, 0.0)
}

/// Component 5, -20..=40: a clean shed drops the turn estimate by one; doing
/// better is an improved exit plan, doing worse means the hand fragmented
fn exit_improvement(
    params: &ScoreParams,
    before: &HandEvaluation,
    after: &HandEvaluation,
) -> f32 {
    let delta = before.min_turns_to_empty as f32 - after.min_turns_to_empty as f32 - 1.0;
    (delta * params.exit_turn_weight).clamp(-20.0, 40.0)
}

/// Component 6, -25..=0: beat the table by as little as possible
fn margin_preference(params: &ScoreParams, combo: &Combo, ctx: &MoveContext) -> f32 {
    let Some(to_beat) = &ctx.to_beat else {
        return 0.0;
    };
    // bombs over non-bombs have no margin to minimize
    if combo.analysis.is_bomb_like() && !to_beat.is_bomb_like() {
        return 0.0;
    }
    let (own, required) = if combo.analysis.hand_type.is_sequence() {
        (combo.analysis.base, to_beat.base)
    } else {
        (combo.analysis.compare_value(), to_beat.compare_value())
    };
    let excess = own.saturating_sub(required).saturating_sub(1) as f32;
    (-excess * params.margin_step_penalty).clamp(-25.0, 0.0)
}

/// Stage multiplier: bombs and rockets are damped early and rewarded late
fn stage_factor(params: &ScoreParams, combo: &Combo, stage: GameStage) -> f32 {
    if !combo.analysis.is_bomb_like() {
        return 1.0;
    }
    match stage {
        GameStage::Early => params.bomb_early_factor,
        GameStage::Mid => params.bomb_mid_factor,
        GameStage::Late => params.bomb_late_factor,
    }
}
