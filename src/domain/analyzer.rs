//! Hand analysis - classifies a card multiset into its Dou Dizhu shape
//!
//! Classification is by exact cardinality and rank-multiplicity pattern, so a
//! multiset maps to at most one shape. Rocket and bomb are checked before the
//! generic count-based shapes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use super::card::{Card, Rank, MAX_POWER, MAX_RUN_POWER, MIN_POWER};

/// Counts are indexed by card power, slots 0..=2 unused
pub const POWER_SLOTS: usize = MAX_POWER as usize + 1;

/// The 14 legal shapes plus `Invalid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandType {
    Single,
    Pair,
    Triple,
    TripleSingle,
    TriplePair,
    Straight,
    PairStraight,
    Airplane,
    AirplaneSingles,
    AirplanePairs,
    QuadSingles,
    QuadPairs,
    Bomb,
    Rocket,
    Invalid,
}

impl HandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandType::Single => "single",
            HandType::Pair => "pair",
            HandType::Triple => "triple",
            HandType::TripleSingle => "triple with single",
            HandType::TriplePair => "triple with pair",
            HandType::Straight => "straight",
            HandType::PairStraight => "consecutive pairs",
            HandType::Airplane => "airplane",
            HandType::AirplaneSingles => "airplane with singles",
            HandType::AirplanePairs => "airplane with pairs",
            HandType::QuadSingles => "four with two singles",
            HandType::QuadPairs => "four with two pairs",
            HandType::Bomb => "bomb",
            HandType::Rocket => "rocket",
            HandType::Invalid => "invalid",
        }
    }

    /// Sequence shapes compare by base rank and require equal length
    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            HandType::Straight
                | HandType::PairStraight
                | HandType::Airplane
                | HandType::AirplaneSingles
                | HandType::AirplanePairs
        )
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result for a card multiset.
///
/// `primary` holds the distinct main-shape powers ascending; `kickers` holds
/// one power per attachment card. `length` and `base` are only meaningful for
/// sequence shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandAnalysis {
    pub hand_type: HandType,
    pub primary: SmallVec<[u8; 12]>,
    pub kickers: SmallVec<[u8; 8]>,
    pub length: usize,
    pub base: u8,
}

impl HandAnalysis {
    pub fn invalid() -> Self {
        HandAnalysis {
            hand_type: HandType::Invalid,
            primary: SmallVec::new(),
            kickers: SmallVec::new(),
            length: 0,
            base: 0,
        }
    }

    fn plain(hand_type: HandType, primary: &[u8], kickers: &[u8]) -> Self {
        HandAnalysis {
            hand_type,
            primary: primary.iter().copied().collect(),
            kickers: kickers.iter().copied().collect(),
            length: 0,
            base: 0,
        }
    }

    fn run(hand_type: HandType, base: u8, length: usize, kickers: &[u8]) -> Self {
        HandAnalysis {
            hand_type,
            primary: (base..base + length as u8).collect(),
            kickers: kickers.iter().copied().collect(),
            length,
            base,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.hand_type != HandType::Invalid
    }

    #[inline]
    pub fn is_bomb_like(&self) -> bool {
        matches!(self.hand_type, HandType::Bomb | HandType::Rocket)
    }

    /// Strength within a matching shape, the maximum primary power
    #[inline]
    pub fn compare_value(&self) -> u8 {
        self.primary.iter().copied().max().unwrap_or(0)
    }
}

/// Tally cards by power
pub fn power_counts(cards: &[Card]) -> [u8; POWER_SLOTS] {
    let mut counts = [0u8; POWER_SLOTS];
    for card in cards {
        counts[card.power() as usize] += 1;
    }
    counts
}

fn present_powers(counts: &[u8; POWER_SLOTS]) -> SmallVec<[u8; 16]> {
    (MIN_POWER..=MAX_POWER)
        .filter(|&p| counts[p as usize] > 0)
        .collect()
}

fn is_consecutive_run(powers: &[u8]) -> bool {
    powers.windows(2).all(|w| w[1] == w[0] + 1)
        && powers.iter().all(|&p| p <= MAX_RUN_POWER)
}

/// Classify a card multiset. Pure and order-independent.
pub fn analyze(cards: &[Card]) -> HandAnalysis {
    if cards.is_empty() {
        return HandAnalysis::invalid();
    }
    let counts = power_counts(cards);
    let present = present_powers(&counts);
    let unique = present.len();
    let len = cards.len();

    let small_joker = Rank::SmallJoker.power() as usize;
    let big_joker = Rank::BigJoker.power() as usize;
    if len == 2 && counts[small_joker] == 1 && counts[big_joker] == 1 {
        return HandAnalysis::plain(
            HandType::Rocket,
            &[small_joker as u8, big_joker as u8],
            &[],
        );
    }
    if len == 4 && unique == 1 {
        return HandAnalysis::plain(HandType::Bomb, &[present[0]], &[]);
    }

    match (len, unique) {
        (1, _) => return HandAnalysis::plain(HandType::Single, &[present[0]], &[]),
        (2, 1) => return HandAnalysis::plain(HandType::Pair, &[present[0]], &[]),
        (3, 1) => return HandAnalysis::plain(HandType::Triple, &[present[0]], &[]),
        _ => {}
    }

    let rank_of = |count: u8| present.iter().copied().find(|&p| counts[p as usize] == count);

    if len == 4 && unique == 2 {
        if let Some(t) = rank_of(3) {
            let kicker = rank_of(1).expect("one card left beside the triple");
            return HandAnalysis::plain(HandType::TripleSingle, &[t], &[kicker]);
        }
    }
    if len == 5 && unique == 2 {
        if let (Some(t), Some(p)) = (rank_of(3), rank_of(2)) {
            return HandAnalysis::plain(HandType::TriplePair, &[t], &[p, p]);
        }
    }
    if len == 6 && unique == 3 {
        if let Some(q) = rank_of(4) {
            let kickers: SmallVec<[u8; 2]> = present
                .iter()
                .copied()
                .filter(|&p| p != q)
                .collect();
            // two distinct single kickers, a split rocket is not allowed
            if kickers.iter().all(|&k| counts[k as usize] == 1)
                && !(counts[small_joker] == 1 && counts[big_joker] == 1)
            {
                return HandAnalysis::plain(HandType::QuadSingles, &[q], &kickers);
            }
        }
    }
    if len == 8 && unique == 3 {
        if let Some(q) = rank_of(4) {
            let pair_ranks: SmallVec<[u8; 2]> = present
                .iter()
                .copied()
                .filter(|&p| p != q && counts[p as usize] == 2)
                .collect();
            if pair_ranks.len() == 2 {
                let kickers = [pair_ranks[0], pair_ranks[0], pair_ranks[1], pair_ranks[1]];
                return HandAnalysis::plain(HandType::QuadPairs, &[q], &kickers);
            }
        }
    }

    let all_count = |n: u8| present.iter().all(|&p| counts[p as usize] == n);

    if len >= 5 && all_count(1) && is_consecutive_run(&present) {
        return HandAnalysis::run(HandType::Straight, present[0], len, &[]);
    }
    if unique >= 3 && all_count(2) && is_consecutive_run(&present) {
        return HandAnalysis::run(HandType::PairStraight, present[0], unique, &[]);
    }
    if unique >= 2 && all_count(3) && is_consecutive_run(&present) {
        return HandAnalysis::run(HandType::Airplane, present[0], unique, &[]);
    }

    if len >= 8 && len % 4 == 0 {
        if let Some(analysis) = airplane_with_wings(&counts, len / 4, 1) {
            return analysis;
        }
    }
    if len >= 10 && len % 5 == 0 {
        if let Some(analysis) = airplane_with_wings(&counts, len / 5, 2) {
            return analysis;
        }
    }

    HandAnalysis::invalid()
}

/// Find an airplane of `wings` consecutive triples whose leftover cards form
/// the wing set: `per_wing` 1 means single wings, 2 means pair wings.
/// Scans from the highest base down and takes the first run that fits.
fn airplane_with_wings(
    counts: &[u8; POWER_SLOTS],
    wings: usize,
    per_wing: u8,
) -> Option<HandAnalysis> {
    if wings < 2 {
        return None;
    }
    let small_joker = Rank::SmallJoker.power() as usize;
    let big_joker = Rank::BigJoker.power() as usize;
    let top_base = MAX_RUN_POWER + 1 - wings as u8;
    for base in (MIN_POWER..=top_base).rev() {
        let run = base..base + wings as u8;
        if run.clone().any(|p| counts[p as usize] != 3) {
            continue;
        }
        let mut kickers: SmallVec<[u8; 8]> = SmallVec::new();
        let mut ok = true;
        for p in MIN_POWER..=MAX_POWER {
            let c = counts[p as usize];
            if c == 0 || run.contains(&p) {
                continue;
            }
            match per_wing {
                1 if c < 4 => kickers.extend(std::iter::repeat(p).take(c as usize)),
                2 if c == 2 => kickers.extend([p, p]),
                _ => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok || kickers.len() != wings * per_wing as usize {
            continue;
        }
        if per_wing == 1
            && counts[small_joker] == 1
            && counts[big_joker] == 1
        {
            // both jokers riding as wings would smuggle a rocket in
            continue;
        }
        let hand_type = if per_wing == 1 {
            HandType::AirplaneSingles
        } else {
            HandType::AirplanePairs
        };
        return Some(HandAnalysis::run(hand_type, base, wings, &kickers));
    }
    None
}
