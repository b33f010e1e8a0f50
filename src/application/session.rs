//! GameSession - the facade the presentation layer drives
//!
//! Owns the current immutable snapshot and the AI engine. Every command
//! returns the fresh snapshot, which is the caller's re-render poll point.
//! Turn pacing stays with the caller: `advance` performs exactly one pending
//! AI turn, so the old timer-driven recursion lives entirely outside the core.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bot::{Decision, DecisionEngine};
use crate::domain::{ActionError, Card, GamePhase, GameState};

pub struct GameSession {
    state: GameState,
    engine: DecisionEngine<ChaCha8Rng>,
    /// The seat driven by toggle/play/pass commands; `None` means every seat
    /// is AI-driven (headless simulation)
    human_seat: Option<usize>,
    seed: Option<u64>,
    rounds_dealt: u64,
}

impl GameSession {
    /// A session with an optional master seed. A fixed seed makes the deal and
    /// every AI decision reproducible.
    pub fn new(seed: Option<u64>, human_seat: Option<usize>) -> Self {
        let engine_rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s ^ 0x5EED_CAFE),
            None => ChaCha8Rng::from_entropy(),
        };
        GameSession {
            state: GameState::new(),
            engine: DecisionEngine::new(engine_rng),
            human_seat,
            seed,
            rounds_dealt: 0,
        }
    }

    /// Current immutable snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn human_seat(&self) -> Option<usize> {
        self.human_seat
    }

    /// Shuffle, deal and enter play. The landlord leads.
    pub fn new_round(&mut self) -> &GameState {
        let round_seed = self.seed.map(|s| s.wrapping_add(self.rounds_dealt));
        self.rounds_dealt += 1;
        self.state = GameState::deal_new(round_seed);
        tracing::info!(
            landlord = self.state.landlord,
            "new round dealt"
        );
        &self.state
    }

    /// Toggle a card in the human selection set. No-op off-turn, outside the
    /// playing phase, or for a card the human does not hold.
    pub fn toggle_card(&mut self, card_id: &str) -> &GameState {
        let Some(human) = self.human_seat else {
            return &self.state;
        };
        if self.state.phase != GamePhase::Playing || self.state.current_turn != human {
            return &self.state;
        }
        let held = self.state.hands[human].iter().any(|c| c.id() == card_id);
        if !held {
            return &self.state;
        }
        self.state = self.state.with_selection_toggled(card_id);
        &self.state
    }

    /// Attempt to play the human's current selection. On rejection the state
    /// is unchanged apart from a feedback message.
    pub fn play_selected(&mut self) -> Result<&GameState, ActionError> {
        let human = self.human_seat.ok_or(ActionError::NotYourTurn)?;
        let cards = self.selected_cards(human);
        match self.state.play(human, &cards) {
            Ok(next) => {
                self.finish_round_if_over(&next);
                self.state = next;
                Ok(&self.state)
            }
            Err(err) => {
                self.state = self.state.with_message(err.to_string());
                Err(err)
            }
        }
    }

    /// Pass the human's turn. Legal only when a hand to beat exists.
    pub fn pass_turn(&mut self) -> Result<&GameState, ActionError> {
        let human = self.human_seat.ok_or(ActionError::NotYourTurn)?;
        match self.state.pass(human) {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(err) => {
                self.state = self.state.with_message(err.to_string());
                Err(err)
            }
        }
    }

    /// Drive exactly one pending AI turn. No-op when the round is not being
    /// played or it is the human's turn.
    pub fn advance(&mut self) -> &GameState {
        if self.state.phase != GamePhase::Playing {
            return &self.state;
        }
        let seat = self.state.current_turn;
        if Some(seat) == self.human_seat {
            return &self.state;
        }

        match self.engine.decide(&self.state, seat) {
            Decision::Play(cards) => match self.state.play(seat, &cards) {
                Ok(next) => {
                    self.finish_round_if_over(&next);
                    self.state = next;
                }
                Err(err) => {
                    tracing::warn!(seat, %err, "AI move rejected, recovering");
                    self.force_progress(seat);
                }
            },
            Decision::Pass => match self.state.pass(seat) {
                Ok(next) => self.state = next,
                Err(err) => {
                    tracing::warn!(seat, %err, "AI pass rejected, recovering");
                    self.force_progress(seat);
                }
            },
        }
        &self.state
    }

    /// Presentation-timeout hook: drop the transient feedback message
    pub fn clear_message(&mut self) -> &GameState {
        if self.state.message.is_some() {
            self.state = self.state.with_message_cleared();
        }
        &self.state
    }

    fn selected_cards(&self, human: usize) -> Vec<Card> {
        self.state.hands[human]
            .iter()
            .filter(|c| self.state.selected.contains(&c.id()))
            .copied()
            .collect()
    }

    /// Last-resort recovery so an AI turn can never stall the game: pass if
    /// legal, otherwise shed the lowest single.
    fn force_progress(&mut self, seat: usize) {
        if let Ok(next) = self.state.pass(seat) {
            self.state = next;
            return;
        }
        let lowest = self.state.hands[seat]
            .iter()
            .min_by_key(|c| (c.power(), c.suit.order()))
            .copied();
        if let Some(card) = lowest {
            if let Ok(next) = self.state.play(seat, &[card]) {
                self.finish_round_if_over(&next);
                self.state = next;
            }
        }
    }

    fn finish_round_if_over(&self, next: &GameState) {
        if next.phase == GamePhase::GameOver {
            tracing::info!(
                winner = next.winner,
                landlord_won = next.landlord_side_won(),
                "round over"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DECK_SIZE;

    fn run_to_completion(session: &mut GameSession) -> usize {
        let mut turns = 0;
        while session.state().phase == GamePhase::Playing && turns < 400 {
            session.advance();
            turns += 1;
        }
        turns
    }

    #[test]
    fn test_headless_game_runs_to_game_over() {
        let mut session = GameSession::new(Some(21), None);
        session.new_round();
        run_to_completion(&mut session);
        assert_eq!(session.state().phase, GamePhase::GameOver);
        assert!(session.state().winner.is_some());
        assert!(session.state().landlord_side_won().is_some());
    }

    #[test]
    fn test_census_holds_through_a_full_game() {
        let mut session = GameSession::new(Some(33), None);
        session.new_round();
        let mut turns = 0;
        while session.state().phase == GamePhase::Playing && turns < 400 {
            let state = session.state();
            assert_eq!(
                state.total_remaining() + state.discard.len(),
                DECK_SIZE
            );
            session.advance();
            turns += 1;
        }
        assert_eq!(session.state().phase, GamePhase::GameOver);
    }

    #[test]
    fn test_toggle_is_noop_for_ai_turns_and_foreign_cards() {
        let mut session = GameSession::new(Some(5), Some(0));
        session.new_round();
        // drive until it is the human's turn
        let mut guard = 0;
        while session.state().current_turn != 0 && guard < 100 {
            session.advance();
            guard += 1;
        }
        assert_eq!(session.state().current_turn, 0);

        let foreign = session.state().hands[1][0].id();
        session.toggle_card(&foreign);
        assert!(session.state().selected.is_empty());

        let own = session.state().hands[0][0].id();
        session.toggle_card(&own);
        assert!(session.state().selected.contains(&own));
        session.toggle_card(&own);
        assert!(session.state().selected.is_empty());
    }

    #[test]
    fn test_empty_selection_rejected_with_message() {
        let mut session = GameSession::new(Some(5), Some(0));
        session.new_round();
        let mut guard = 0;
        while session.state().current_turn != 0 && guard < 100 {
            session.advance();
            guard += 1;
        }
        let before_turn = session.state().current_turn;
        let err = session.play_selected().unwrap_err();
        assert_eq!(err, ActionError::EmptySelection);
        assert!(session.state().message.is_some());
        assert_eq!(session.state().current_turn, before_turn);

        session.clear_message();
        assert!(session.state().message.is_none());
    }

    #[test]
    fn test_human_session_plays_a_full_game() {
        let mut session = GameSession::new(Some(8), Some(0));
        session.new_round();
        let mut turns = 0;
        while session.state().phase == GamePhase::Playing && turns < 400 {
            if session.state().current_turn == 0 {
                if session.pass_turn().is_err() {
                    // no table to beat: open with the lowest single
                    let lowest = session.state().hands[0]
                        .iter()
                        .min_by_key(|c| (c.power(), c.suit.order()))
                        .copied()
                        .unwrap();
                    session.toggle_card(&lowest.id());
                    session
                        .play_selected()
                        .expect("a lowest single always opens");
                }
            } else {
                session.advance();
            }
            turns += 1;
        }
        assert_eq!(session.state().phase, GamePhase::GameOver);
    }

    #[test]
    fn test_advance_is_noop_on_human_turn_and_after_game_over() {
        let mut session = GameSession::new(Some(5), Some(0));
        session.new_round();
        let mut guard = 0;
        while session.state().current_turn != 0 && guard < 100 {
            session.advance();
            guard += 1;
        }
        let snapshot = session.state().clone();
        session.advance();
        assert_eq!(session.state(), &snapshot);
    }

    #[test]
    fn test_same_seed_reproduces_the_whole_game() {
        let mut a = GameSession::new(Some(77), None);
        let mut b = GameSession::new(Some(77), None);
        a.new_round();
        b.new_round();
        run_to_completion(&mut a);
        run_to_completion(&mut b);
        assert_eq!(a.state(), b.state());
    }
}
