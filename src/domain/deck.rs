//! Deck construction, seeded shuffling and the 17/17/17+3 deal

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::card::{sort_hand, Card, Rank, Suit};

/// Number of cards in a full deck
pub const DECK_SIZE: usize = 54;
/// Cards dealt to each player before the bottom is claimed
pub const HAND_SIZE: usize = 17;
/// Cards set aside for the landlord
pub const BOTTOM_SIZE: usize = 3;

/// An ordered 54-card deck. Consumed once by `deal` and then gone.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

/// The result of dealing a full deck: three 17-card hands plus the bottom.
#[derive(Debug, Clone)]
pub struct DealResult {
    pub hands: [Vec<Card>; 3],
    pub bottom: Vec<Card>,
}

impl Deck {
    /// Build the standard 52 + 2 joker deck in canonical order
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
        for suit in suits {
            for power in 3..=15 {
                let rank = Rank::from_power(power).expect("ordinary rank power");
                cards.push(Card::new(rank, suit));
            }
        }
        cards.push(Card::new(Rank::SmallJoker, Suit::Joker));
        cards.push(Card::new(Rank::BigJoker, Suit::Joker));
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    /// Deal the deck into three sorted 17-card hands plus the 3 bottom cards.
    ///
    /// Dealing from anything but a full 54-card deck is corrupted setup and
    /// aborts.
    pub fn deal(mut self) -> DealResult {
        assert_eq!(
            self.cards.len(),
            DECK_SIZE,
            "deal requires a full {DECK_SIZE}-card deck"
        );
        let bottom = self.cards.split_off(DECK_SIZE - BOTTOM_SIZE);
        let mut hands = [
            Vec::with_capacity(HAND_SIZE + BOTTOM_SIZE),
            Vec::with_capacity(HAND_SIZE),
            Vec::with_capacity(HAND_SIZE),
        ];
        for (i, card) in self.cards.into_iter().enumerate() {
            hands[i % 3].push(card);
        }
        for hand in hands.iter_mut() {
            sort_hand(hand);
        }
        DealResult { hands, bottom }
    }
}

/// Build the round RNG from an optional seed
pub fn round_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_has_54_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        let ids: HashSet<String> = deck.cards.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), DECK_SIZE);
    }

    #[test]
    fn test_deal_shapes() {
        let mut deck = Deck::standard();
        deck.shuffle(&mut round_rng(Some(42)));
        let deal = deck.deal();
        for hand in &deal.hands {
            assert_eq!(hand.len(), HAND_SIZE);
        }
        assert_eq!(deal.bottom.len(), BOTTOM_SIZE);
    }

    #[test]
    fn test_deal_partitions_deck() {
        let mut deck = Deck::standard();
        deck.shuffle(&mut round_rng(Some(7)));
        let deal = deck.deal();

        let mut all: Vec<Card> = deal.hands.iter().flatten().copied().collect();
        all.extend(deal.bottom.iter().copied());
        assert_eq!(all.len(), DECK_SIZE);

        let mut seen: Vec<String> = all.iter().map(|c| c.id()).collect();
        seen.sort();
        let mut expected: Vec<String> =
            Deck::standard().cards.iter().map(|c| c.id()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let mut a = Deck::standard();
        let mut b = Deck::standard();
        a.shuffle(&mut round_rng(Some(99)));
        b.shuffle(&mut round_rng(Some(99)));
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    #[should_panic(expected = "54-card deck")]
    fn test_deal_rejects_short_deck() {
        let mut deck = Deck::standard();
        deck.cards.pop();
        let _ = deck.deal();
    }
}
