//! Immutable game state and validated turn transitions
//!
//! Every mutator returns a new instance, so a snapshot handed to the render
//! layer is never written to. The timer-driven turn loop of old lives outside
//! this module: callers drive the machine one validated action at a time.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use super::analyzer::{analyze, HandAnalysis};
use super::card::{sort_hand, Card};
use super::comparator::{beat_rejection, BeatRejection};
use super::deck::{round_rng, Deck, DECK_SIZE};

/// Dou Dizhu is always three-handed
pub const PLAYER_COUNT: usize = 3;

pub type Hand = SmallVec<[Card; 20]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Initial,
    Bidding,
    Playing,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Initial => "initial",
            GamePhase::Bidding => "bidding",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "gameOver",
        }
    }
}

/// The hand currently on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPlay {
    pub analysis: HandAnalysis,
    pub cards: SmallVec<[Card; 20]>,
    pub player: usize,
}

/// An action a player may not take right now. Never fatal: the caller attaches
/// the message to an unchanged state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("the round is not being played")]
    WrongPhase,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("no cards selected")]
    EmptySelection,
    #[error("you do not hold those cards")]
    CardsNotOwned,
    #[error("{0}")]
    CannotBeat(#[from] BeatRejection),
    #[error("you can only pass when there is a hand to beat")]
    CannotPass,
}

/// Full game state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: GamePhase,
    pub hands: [Hand; PLAYER_COUNT],
    /// The three cards set aside at the deal. Kept for display after the
    /// landlord claims them; the cards themselves live in the landlord's hand.
    pub bottom: SmallVec<[Card; 3]>,
    /// Everything played so far this round
    pub discard: Vec<Card>,
    pub landlord: Option<usize>,
    pub current_turn: usize,
    pub last_play: Option<LastPlay>,
    pub pass_count: u8,
    /// The human player's pending selection, by card id
    pub selected: BTreeSet<String>,
    /// Transient feedback message for the render layer
    pub message: Option<String>,
    pub winner: Option<usize>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty pre-deal state
    pub fn new() -> Self {
        GameState {
            phase: GamePhase::Initial,
            hands: Default::default(),
            bottom: SmallVec::new(),
            discard: Vec::new(),
            landlord: None,
            current_turn: 0,
            last_play: None,
            pass_count: 0,
            selected: BTreeSet::new(),
            message: None,
            winner: None,
        }
    }

    /// Shuffle, deal 17/17/17+3 and assign the landlord.
    ///
    /// Bidding strategy is out of scope, so the bidding phase resolves
    /// atomically with a trivial rule: the landlord seat is drawn from the
    /// round RNG and the bottom cards join that hand. The landlord leads.
    pub fn deal_new(seed: Option<u64>) -> Self {
        let mut rng = round_rng(seed);
        let mut deck = Deck::standard();
        deck.shuffle(&mut rng);
        let deal = deck.deal();

        let landlord = rng.gen_range(0..PLAYER_COUNT);
        let mut hands: [Hand; PLAYER_COUNT] = Default::default();
        for (seat, dealt) in deal.hands.into_iter().enumerate() {
            hands[seat] = dealt.into_iter().collect();
        }
        hands[landlord].extend(deal.bottom.iter().copied());
        for hand in hands.iter_mut() {
            sort_hand(hand);
        }

        let state = GameState {
            phase: GamePhase::Playing,
            hands,
            bottom: deal.bottom.into_iter().collect(),
            discard: Vec::new(),
            landlord: Some(landlord),
            current_turn: landlord,
            last_play: None,
            pass_count: 0,
            selected: BTreeSet::new(),
            message: None,
            winner: None,
        };
        state.debug_assert_census();
        state
    }

    #[inline]
    pub fn hand(&self, seat: usize) -> &Hand {
        &self.hands[seat]
    }

    pub fn hand_sizes(&self) -> [usize; PLAYER_COUNT] {
        [self.hands[0].len(), self.hands[1].len(), self.hands[2].len()]
    }

    /// Total cards still held across all seats
    pub fn total_remaining(&self) -> usize {
        self.hands.iter().map(|h| h.len()).sum()
    }

    /// The analysis the current player must beat, if any
    pub fn hand_to_beat(&self) -> Option<&HandAnalysis> {
        self.last_play.as_ref().map(|lp| &lp.analysis)
    }

    /// Farmers are teammates of each other; the landlord has none
    pub fn are_teammates(&self, a: usize, b: usize) -> bool {
        match self.landlord {
            Some(landlord) => a != b && a != landlord && b != landlord,
            None => false,
        }
    }

    /// Whether the winning seat was the landlord, once the round is over
    pub fn landlord_side_won(&self) -> Option<bool> {
        self.winner.map(|w| Some(w) == self.landlord)
    }

    /// Play `cards` from `seat`'s hand, returning the successor state
    pub fn play(&self, seat: usize, cards: &[Card]) -> Result<GameState, ActionError> {
        if self.phase != GamePhase::Playing {
            return Err(ActionError::WrongPhase);
        }
        if seat != self.current_turn {
            return Err(ActionError::NotYourTurn);
        }
        if cards.is_empty() {
            return Err(ActionError::EmptySelection);
        }
        if !self.owns_all(seat, cards) {
            return Err(ActionError::CardsNotOwned);
        }
        let analysis = analyze(cards);
        let previous = self
            .last_play
            .as_ref()
            .filter(|lp| lp.player != seat)
            .map(|lp| &lp.analysis);
        if let Some(rejection) = beat_rejection(&analysis, previous) {
            return Err(ActionError::CannotBeat(rejection));
        }

        let mut next = self.clone();
        for card in cards {
            let pos = next.hands[seat]
                .iter()
                .position(|c| c == card)
                .expect("ownership was checked");
            next.hands[seat].remove(pos);
        }
        next.discard.extend(cards.iter().copied());
        next.last_play = Some(LastPlay {
            analysis,
            cards: cards.iter().copied().collect(),
            player: seat,
        });
        next.pass_count = 0;
        next.selected.clear();
        next.message = None;

        if next.hands[seat].is_empty() {
            next.phase = GamePhase::GameOver;
            next.winner = Some(seat);
        } else {
            next.current_turn = (seat + 1) % PLAYER_COUNT;
        }
        next.debug_assert_census();
        Ok(next)
    }

    /// Pass the turn. Legal only when another player's hand is on the table.
    /// The second consecutive pass clears the table so the next player opens.
    pub fn pass(&self, seat: usize) -> Result<GameState, ActionError> {
        if self.phase != GamePhase::Playing {
            return Err(ActionError::WrongPhase);
        }
        if seat != self.current_turn {
            return Err(ActionError::NotYourTurn);
        }
        match &self.last_play {
            Some(lp) if lp.player != seat => {}
            _ => return Err(ActionError::CannotPass),
        }

        let mut next = self.clone();
        next.pass_count += 1;
        if next.pass_count >= 2 {
            next.last_play = None;
            next.pass_count = 0;
        }
        next.current_turn = (seat + 1) % PLAYER_COUNT;
        next.message = None;
        next.debug_assert_census();
        Ok(next)
    }

    /// Successor state with `id` toggled in the selection set
    pub fn with_selection_toggled(&self, id: &str) -> GameState {
        let mut next = self.clone();
        if !next.selected.remove(id) {
            next.selected.insert(id.to_string());
        }
        next
    }

    /// Successor state carrying a transient feedback message
    pub fn with_message(&self, message: impl Into<String>) -> GameState {
        let mut next = self.clone();
        next.message = Some(message.into());
        next
    }

    /// Successor state with the feedback message cleared
    pub fn with_message_cleared(&self) -> GameState {
        let mut next = self.clone();
        next.message = None;
        next
    }

    /// Snapshot as JSON for the render boundary
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("state serializes")
    }

    fn owns_all(&self, seat: usize, cards: &[Card]) -> bool {
        let hand = &self.hands[seat];
        let mut needed: std::collections::HashMap<Card, usize> = std::collections::HashMap::new();
        for card in cards {
            *needed.entry(*card).or_insert(0) += 1;
        }
        needed
            .iter()
            .all(|(card, count)| hand.iter().filter(|c| *c == card).count() >= *count)
    }

    /// Cards must partition the deck at all times once a round is dealt
    fn debug_assert_census(&self) {
        if matches!(self.phase, GamePhase::Playing | GamePhase::GameOver) {
            let held: usize = self.total_remaining();
            debug_assert_eq!(
                held + self.discard.len(),
                DECK_SIZE,
                "card census violated: {held} held + {} discarded",
                self.discard.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{Rank, Suit};
    use std::collections::HashSet;

    #[test]
    fn test_deal_new_shapes_and_turn() {
        let state = GameState::deal_new(Some(42));
        let landlord = state.landlord.unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.current_turn, landlord);
        assert_eq!(state.hands[landlord].len(), 20);
        for seat in 0..PLAYER_COUNT {
            if seat != landlord {
                assert_eq!(state.hands[seat].len(), 17);
            }
        }
        assert_eq!(state.bottom.len(), 3);
    }

    #[test]
    fn test_deal_new_partitions_deck() {
        let state = GameState::deal_new(Some(7));
        let ids: HashSet<String> = state
            .hands
            .iter()
            .flatten()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids.len(), DECK_SIZE);
    }

    #[test]
    fn test_deal_new_is_deterministic_for_a_seed() {
        let a = GameState::deal_new(Some(11));
        let b = GameState::deal_new(Some(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_play_removes_cards_and_advances() {
        let state = GameState::deal_new(Some(42));
        let seat = state.current_turn;
        let card = state.hands[seat][0];
        let next = state.play(seat, &[card]).unwrap();
        assert_eq!(next.hands[seat].len(), state.hands[seat].len() - 1);
        assert_eq!(next.current_turn, (seat + 1) % PLAYER_COUNT);
        assert_eq!(next.discard, vec![card]);
        assert!(next.last_play.is_some());
        // the original snapshot is untouched
        assert_eq!(state.discard.len(), 0);
    }

    #[test]
    fn test_play_rejects_wrong_turn() {
        let state = GameState::deal_new(Some(42));
        let wrong = (state.current_turn + 1) % PLAYER_COUNT;
        let card = state.hands[wrong][0];
        assert_eq!(
            state.play(wrong, &[card]),
            Err(ActionError::NotYourTurn)
        );
    }

    #[test]
    fn test_play_rejects_unowned_cards() {
        let state = GameState::deal_new(Some(42));
        let seat = state.current_turn;
        let foreign = state.hands[(seat + 1) % PLAYER_COUNT][0];
        assert_eq!(
            state.play(seat, &[foreign]),
            Err(ActionError::CardsNotOwned)
        );
    }

    #[test]
    fn test_pass_requires_hand_to_beat() {
        let state = GameState::deal_new(Some(42));
        assert_eq!(
            state.pass(state.current_turn),
            Err(ActionError::CannotPass)
        );
    }

    #[test]
    fn test_two_passes_clear_the_table() {
        let state = GameState::deal_new(Some(42));
        let leader = state.current_turn;
        let card = state.hands[leader][0];
        let after_play = state.play(leader, &[card]).unwrap();

        let after_one = after_play.pass(after_play.current_turn).unwrap();
        assert!(after_one.last_play.is_some());
        assert_eq!(after_one.pass_count, 1);

        let after_two = after_one.pass(after_one.current_turn).unwrap();
        assert!(after_two.last_play.is_none());
        assert_eq!(after_two.pass_count, 0);
        // back to the original leader, free to open
        assert_eq!(after_two.current_turn, leader);
    }

    #[test]
    fn test_winner_on_emptied_hand() {
        let mut state = GameState::deal_new(Some(42));
        let seat = state.current_turn;
        let card = state.hands[seat][0];
        // park all but one card in the discard so the census stays balanced
        let spares: Vec<Card> = state.hands[seat].drain(1..).collect();
        state.discard.extend(spares);

        let next = state.play(seat, &[card]).unwrap();
        assert_eq!(next.phase, GamePhase::GameOver);
        assert_eq!(next.winner, Some(seat));
    }

    #[test]
    fn test_selection_toggle_round_trips() {
        let state = GameState::deal_new(Some(42));
        let card = Card::new(Rank::Ace, Suit::Spades);
        let selected = state.with_selection_toggled(&card.id());
        assert!(selected.selected.contains(&card.id()));
        let unselected = selected.with_selection_toggled(&card.id());
        assert!(!unselected.selected.contains(&card.id()));
    }

    #[test]
    fn test_message_helpers() {
        let state = GameState::deal_new(Some(42));
        let with = state.with_message("not your turn");
        assert_eq!(with.message.as_deref(), Some("not your turn"));
        assert_eq!(with.with_message_cleared().message, None);
    }

    #[test]
    fn test_teammates() {
        let mut state = GameState::deal_new(Some(42));
        state.landlord = Some(1);
        assert!(state.are_teammates(0, 2));
        assert!(!state.are_teammates(0, 1));
        assert!(!state.are_teammates(2, 2));
    }
}
