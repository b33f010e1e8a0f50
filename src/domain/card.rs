//! Card model - immutable card identity and the Dou Dizhu power order

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest card power (the rank 3)
pub const MIN_POWER: u8 = 3;
/// Highest card power (the big joker)
pub const MAX_POWER: u8 = 17;
/// Powers at or above this count as control cards (A, 2, jokers)
pub const CONTROL_POWER: u8 = 14;
/// Highest power that may appear inside a straight run (the ace)
pub const MAX_RUN_POWER: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    Joker,
}

impl Suit {
    /// Stable tiebreak order used when sorting a hand for display
    pub fn order(&self) -> u8 {
        match self {
            Suit::Clubs => 1,
            Suit::Diamonds => 2,
            Suit::Hearts => 3,
            Suit::Spades => 4,
            Suit::Joker => 5,
        }
    }

    fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
            Suit::Joker => 'J',
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        match ch {
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            'H' => Some(Suit::Hearts),
            'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Card rank. Discriminants are the Dou Dizhu power order: 3 is the weakest
/// ordinary card, 2 outranks the ace, jokers outrank everything.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
    Two = 15,
    SmallJoker = 16,
    BigJoker = 17,
}

impl Rank {
    /// Total-order strength in 3..=17
    #[inline]
    pub fn power(&self) -> u8 {
        *self as u8
    }

    pub fn from_power(power: u8) -> Option<Self> {
        match power {
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            15 => Some(Rank::Two),
            16 => Some(Rank::SmallJoker),
            17 => Some(Rank::BigJoker),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::SmallJoker => "RJ",
            Rank::BigJoker => "BJ",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" => Some(Rank::Ten),
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            "A" => Some(Rank::Ace),
            "2" => Some(Rank::Two),
            "RJ" => Some(Rank::SmallJoker),
            "BJ" => Some(Rank::BigJoker),
            _ => None,
        }
    }

    #[inline]
    pub fn is_joker(&self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }

    /// Whether this rank may appear inside straight-style runs.
    /// 2 and the jokers never do.
    #[inline]
    pub fn is_straightable(&self) -> bool {
        self.power() <= MAX_RUN_POWER
    }
}

/// Immutable card identity. Equality is by (rank, suit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    #[inline]
    pub fn power(&self) -> u8 {
        self.rank.power()
    }

    #[inline]
    pub fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }

    /// Stable string id used for selection-set membership, never ownership.
    /// Jokers are "RJ"/"BJ", ordinary cards are suit char + rank text.
    pub fn id(&self) -> String {
        if self.rank.is_joker() {
            return self.rank.to_str().to_string();
        }
        format!("{}{}", self.suit.to_char(), self.rank.to_str())
    }

    pub fn from_id(id: &str) -> Option<Self> {
        if id == "RJ" {
            return Some(Card::new(Rank::SmallJoker, Suit::Joker));
        }
        if id == "BJ" {
            return Some(Card::new(Rank::BigJoker, Suit::Joker));
        }
        let mut chars = id.chars();
        let suit = Suit::from_char(chars.next()?)?;
        let rank = Rank::from_str(&chars.collect::<String>())?;
        if rank.is_joker() {
            return None;
        }
        Some(Card { rank, suit })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Sort a hand into canonical display order, weakest first
pub fn sort_hand(hand: &mut [Card]) {
    hand.sort_by_key(|card| (card.power(), card.suit.order()));
}
