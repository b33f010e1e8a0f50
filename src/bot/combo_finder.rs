//! Combo enumeration - every legal shape latent in a hand
//!
//! The combinatorial hot path of the AI. Enumeration works on rank
//! multiplicities; every produced card set is passed back through the analyzer
//! so a kicker choice can never smuggle in a different shape. Stays tractable
//! for the landlord's 20-card hand: each family is O(ranks x lengths) plus the
//! bounded kicker combinations.

use smallvec::SmallVec;

use crate::domain::{
    analyze, can_beat, power_counts, Card, HandAnalysis, HandType, Rank, MAX_POWER,
    MAX_RUN_POWER, MIN_POWER, POWER_SLOTS,
};

/// Straight runs span 5..=12 ranks
pub const STRAIGHT_LENGTHS: std::ops::RangeInclusive<usize> = 5..=12;
/// Consecutive-pair runs span 3..=10 pair ranks
pub const PAIR_RUN_LENGTHS: std::ops::RangeInclusive<usize> = 3..=10;
/// Pure airplanes span 2..=6 triple ranks
pub const AIRPLANE_LENGTHS: std::ops::RangeInclusive<usize> = 2..=6;
/// Airplanes with kickers are bounded to 2..=4 wings to cap the combinatorics
pub const AIRPLANE_WING_LENGTHS: std::ops::RangeInclusive<usize> = 2..=4;

pub type ComboCards = SmallVec<[Card; 20]>;

/// A concrete playable card set plus its analysis. Ephemeral: produced by
/// enumeration, scored, and discarded each decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub cards: ComboCards,
    pub analysis: HandAnalysis,
}

/// Enumerate every legal combo latent in `hand`
pub fn find_all_combos(hand: &[Card]) -> Vec<Combo> {
    if hand.is_empty() {
        return Vec::new();
    }
    let by_power = cards_by_power(hand);
    let counts = power_counts(hand);

    let mut combos = Vec::with_capacity(hand.len() + 48);
    push_rank_groups(&mut combos, &by_power);
    push_rocket(&mut combos, &by_power);
    push_triple_attachments(&mut combos, &by_power, &counts);
    push_quad_attachments(&mut combos, &by_power, &counts);
    push_runs(&mut combos, &by_power, &counts);
    push_airplane_wings(&mut combos, &by_power, &counts);
    combos
}

/// Enumerate the combos in `hand` that beat `last`
pub fn find_beating_combos(hand: &[Card], last: &HandAnalysis) -> Vec<Combo> {
    find_all_combos(hand)
        .into_iter()
        .filter(|combo| can_beat(&combo.analysis, Some(last)))
        .collect()
}

fn cards_by_power(hand: &[Card]) -> [SmallVec<[Card; 4]>; POWER_SLOTS] {
    let mut by_power: [SmallVec<[Card; 4]>; POWER_SLOTS] = Default::default();
    for &card in hand {
        by_power[card.power() as usize].push(card);
    }
    by_power
}

/// Keep a candidate only when the analyzer confirms the expected shape
fn push_checked(
    combos: &mut Vec<Combo>,
    cards: ComboCards,
    expected: HandType,
) {
    let analysis = analyze(&cards);
    if analysis.hand_type == expected {
        combos.push(Combo { cards, analysis });
    }
}

/// Singles, pairs, triples and bombs straight from rank multiplicity
fn push_rank_groups(combos: &mut Vec<Combo>, by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS]) {
    for power in MIN_POWER..=MAX_POWER {
        let cards = &by_power[power as usize];
        let shapes: [(usize, HandType); 4] = [
            (1, HandType::Single),
            (2, HandType::Pair),
            (3, HandType::Triple),
            (4, HandType::Bomb),
        ];
        for (take, expected) in shapes {
            if cards.len() >= take {
                push_checked(combos, cards[..take].iter().copied().collect(), expected);
            }
        }
    }
}

fn push_rocket(combos: &mut Vec<Combo>, by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS]) {
    let small = &by_power[Rank::SmallJoker.power() as usize];
    let big = &by_power[Rank::BigJoker.power() as usize];
    if let (Some(&s), Some(&b)) = (small.first(), big.first()) {
        push_checked(combos, SmallVec::from_slice(&[s, b]), HandType::Rocket);
    }
}

fn push_triple_attachments(
    combos: &mut Vec<Combo>,
    by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS],
    counts: &[u8; POWER_SLOTS],
) {
    for triple in MIN_POWER..=MAX_POWER {
        if counts[triple as usize] < 3 {
            continue;
        }
        let base: ComboCards = by_power[triple as usize][..3].iter().copied().collect();
        for kicker in MIN_POWER..=MAX_POWER {
            if kicker == triple {
                continue;
            }
            let kicker_cards = &by_power[kicker as usize];
            if !kicker_cards.is_empty() {
                let mut cards = base.clone();
                cards.push(kicker_cards[0]);
                push_checked(combos, cards, HandType::TripleSingle);
            }
            if kicker_cards.len() >= 2 {
                let mut cards = base.clone();
                cards.extend_from_slice(&kicker_cards[..2]);
                push_checked(combos, cards, HandType::TriplePair);
            }
        }
    }
}

fn push_quad_attachments(
    combos: &mut Vec<Combo>,
    by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS],
    counts: &[u8; POWER_SLOTS],
) {
    for quad in MIN_POWER..=MAX_POWER {
        if counts[quad as usize] != 4 {
            continue;
        }
        let base: ComboCards = by_power[quad as usize].iter().copied().collect();

        let single_ranks: SmallVec<[u8; 16]> = (MIN_POWER..=MAX_POWER)
            .filter(|&p| p != quad && counts[p as usize] >= 1)
            .collect();
        for pick in rank_pairs(&single_ranks) {
            let mut cards = base.clone();
            cards.push(by_power[pick[0] as usize][0]);
            cards.push(by_power[pick[1] as usize][0]);
            push_checked(combos, cards, HandType::QuadSingles);
        }

        let pair_ranks: SmallVec<[u8; 16]> = (MIN_POWER..=MAX_POWER)
            .filter(|&p| p != quad && counts[p as usize] >= 2)
            .collect();
        for pick in rank_pairs(&pair_ranks) {
            let mut cards = base.clone();
            cards.extend_from_slice(&by_power[pick[0] as usize][..2]);
            cards.extend_from_slice(&by_power[pick[1] as usize][..2]);
            push_checked(combos, cards, HandType::QuadPairs);
        }
    }
}

/// Straights, consecutive pairs and pure airplanes
fn push_runs(
    combos: &mut Vec<Combo>,
    by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS],
    counts: &[u8; POWER_SLOTS],
) {
    let families: [(std::ops::RangeInclusive<usize>, u8, HandType); 3] = [
        (STRAIGHT_LENGTHS, 1, HandType::Straight),
        (PAIR_RUN_LENGTHS, 2, HandType::PairStraight),
        (AIRPLANE_LENGTHS, 3, HandType::Airplane),
    ];
    for (lengths, need, expected) in families {
        for length in lengths {
            let top_base = MAX_RUN_POWER as usize + 1 - length;
            for base in (MIN_POWER as usize)..=top_base {
                if (base..base + length).any(|p| (counts[p] as usize) < need as usize) {
                    continue;
                }
                let mut cards: ComboCards = SmallVec::new();
                for p in base..base + length {
                    cards.extend_from_slice(&by_power[p][..need as usize]);
                }
                push_checked(combos, cards, expected);
            }
        }
    }
}

/// Airplanes carrying single or pair wings
fn push_airplane_wings(
    combos: &mut Vec<Combo>,
    by_power: &[SmallVec<[Card; 4]>; POWER_SLOTS],
    counts: &[u8; POWER_SLOTS],
) {
    for wings in AIRPLANE_WING_LENGTHS {
        let top_base = MAX_RUN_POWER as usize + 1 - wings;
        for base in (MIN_POWER as usize)..=top_base {
            let run = base..base + wings;
            if run.clone().any(|p| (counts[p] as usize) < 3) {
                continue;
            }
            let mut body: ComboCards = SmallVec::new();
            for p in run.clone() {
                body.extend_from_slice(&by_power[p][..3]);
            }

            let single_ranks: SmallVec<[u8; 16]> = (MIN_POWER..=MAX_POWER)
                .filter(|&p| !run.contains(&(p as usize)) && counts[p as usize] >= 1)
                .collect();
            for pick in rank_choices(&single_ranks, wings) {
                let mut cards = body.clone();
                for &p in &pick {
                    cards.push(by_power[p as usize][0]);
                }
                push_checked(combos, cards, HandType::AirplaneSingles);
            }

            let pair_ranks: SmallVec<[u8; 16]> = (MIN_POWER..=MAX_POWER)
                .filter(|&p| !run.contains(&(p as usize)) && counts[p as usize] >= 2)
                .collect();
            for pick in rank_choices(&pair_ranks, wings) {
                let mut cards = body.clone();
                for &p in &pick {
                    cards.extend_from_slice(&by_power[p as usize][..2]);
                }
                push_checked(combos, cards, HandType::AirplanePairs);
            }
        }
    }
}

/// All unordered pairs of distinct ranks
fn rank_pairs(ranks: &[u8]) -> Vec<SmallVec<[u8; 4]>> {
    rank_choices(ranks, 2)
}

/// All k-combinations of distinct ranks, in ascending order
fn rank_choices(ranks: &[u8], k: usize) -> Vec<SmallVec<[u8; 4]>> {
    let mut out = Vec::new();
    if k == 0 || ranks.len() < k {
        return out;
    }
    let mut current: SmallVec<[u8; 4]> = SmallVec::new();
    choose_from(ranks, k, 0, &mut current, &mut out);
    out
}

fn choose_from(
    ranks: &[u8],
    k: usize,
    start: usize,
    current: &mut SmallVec<[u8; 4]>,
    out: &mut Vec<SmallVec<[u8; 4]>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    let still_needed = k - current.len();
    for i in start..=ranks.len().saturating_sub(still_needed) {
        current.push(ranks[i]);
        choose_from(ranks, k, i + 1, current, out);
        current.pop();
    }
}
