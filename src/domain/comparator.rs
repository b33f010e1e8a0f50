//! Hand comparison - decides whether one classified hand beats another

use super::analyzer::{HandAnalysis, HandType};

/// Why a hand fails to beat the hand on the table. One variant per failure
/// path, each with a short player-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeatRejection {
    #[error("that is not a playable combination")]
    InvalidHand,
    #[error("nothing beats a rocket")]
    RocketUnbeatable,
    #[error("only a bomb or rocket can beat a bomb")]
    OnlyBombBeatsBomb,
    #[error("a bomb can only be beaten by a stronger bomb")]
    WeakerBomb,
    #[error("the play must match the {0} on the table")]
    TypeMismatch(HandType),
    #[error("the run must have the same length as the one on the table")]
    LengthMismatch,
    #[error("the play is not strong enough to beat the table")]
    TooWeak,
}

/// True when `current` may be played over `previous`. `None` means the player
/// holds the lead and any valid hand qualifies.
pub fn can_beat(current: &HandAnalysis, previous: Option<&HandAnalysis>) -> bool {
    beat_rejection(current, previous).is_none()
}

/// The rejection reason, or `None` when the play stands.
pub fn beat_rejection(
    current: &HandAnalysis,
    previous: Option<&HandAnalysis>,
) -> Option<BeatRejection> {
    if !current.is_valid() {
        return Some(BeatRejection::InvalidHand);
    }
    let previous = match previous {
        None => return None,
        Some(prev) => prev,
    };

    if previous.hand_type == HandType::Rocket {
        return Some(BeatRejection::RocketUnbeatable);
    }
    if current.hand_type == HandType::Rocket {
        return None;
    }
    if current.hand_type == HandType::Bomb {
        return match previous.hand_type {
            HandType::Bomb if current.compare_value() <= previous.compare_value() => {
                Some(BeatRejection::WeakerBomb)
            }
            _ => None,
        };
    }
    if previous.hand_type == HandType::Bomb {
        return Some(BeatRejection::OnlyBombBeatsBomb);
    }
    if current.hand_type != previous.hand_type {
        return Some(BeatRejection::TypeMismatch(previous.hand_type));
    }
    if current.hand_type.is_sequence() {
        if current.length != previous.length {
            return Some(BeatRejection::LengthMismatch);
        }
        if current.base <= previous.base {
            return Some(BeatRejection::TooWeak);
        }
        return None;
    }
    if current.compare_value() <= previous.compare_value() {
        return Some(BeatRejection::TooWeak);
    }
    None
}
