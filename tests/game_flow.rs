//! Integration tests: dealing, the play/pass flow and the AI loop end to end

use doudizhu_engine::application::GameSession;
use doudizhu_engine::bot::{find_all_combos, find_beating_combos};
use doudizhu_engine::domain::{
    analyze, Card, Deck, GamePhase, GameState, HandType, Rank, Suit, DECK_SIZE,
};

fn of_powers(groups: &[(u8, usize)]) -> Vec<Card> {
    let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
    let mut cards = Vec::new();
    for &(power, count) in groups {
        for i in 0..count {
            let rank = Rank::from_power(power).unwrap();
            let suit = if rank.is_joker() { Suit::Joker } else { suits[i] };
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

#[test]
fn dealing_reproduces_the_standard_deck_exactly_once() {
    let state = GameState::deal_new(Some(123));
    let mut dealt: Vec<String> = state.hands.iter().flatten().map(|c| c.id()).collect();
    dealt.sort();

    let mut expected: Vec<String> = Deck::standard().cards().iter().map(|c| c.id()).collect();
    expected.sort();

    assert_eq!(dealt.len(), DECK_SIZE);
    assert_eq!(dealt, expected);
}

#[test]
fn landlord_holds_the_bottom_cards() {
    let state = GameState::deal_new(Some(9));
    let landlord = state.landlord.unwrap();
    assert_eq!(state.hands[landlord].len(), 20);
    for card in &state.bottom {
        assert!(state.hands[landlord].contains(card));
    }
}

#[test]
fn card_census_holds_at_every_step_of_a_full_game() {
    let mut session = GameSession::new(Some(4), None);
    session.new_round();
    let mut turns = 0;
    loop {
        let state = session.state();
        let held: usize = state.total_remaining();
        assert_eq!(held + state.discard.len(), DECK_SIZE);

        let mut ids: Vec<String> = state
            .hands
            .iter()
            .flatten()
            .map(|c| c.id())
            .chain(state.discard.iter().map(|c| c.id()))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DECK_SIZE, "duplicate or lost card identity");

        if state.phase != GamePhase::Playing || turns >= 400 {
            break;
        }
        session.advance();
        turns += 1;
    }
    assert_eq!(session.state().phase, GamePhase::GameOver);
}

#[test]
fn triple_hand_yields_triple_and_triple_single() {
    // [3♠ 3♥ 3♦ 4♣] with no previous play
    let hand = vec![
        Card::new(Rank::Three, Suit::Spades),
        Card::new(Rank::Three, Suit::Hearts),
        Card::new(Rank::Three, Suit::Diamonds),
        Card::new(Rank::Four, Suit::Clubs),
    ];
    let combos = find_all_combos(&hand);
    let triple = combos
        .iter()
        .find(|c| c.analysis.hand_type == HandType::Triple)
        .expect("triple of 3s");
    let triple_single = combos
        .iter()
        .find(|c| c.analysis.hand_type == HandType::TripleSingle)
        .expect("triple of 3s with the 4");
    assert!(triple.analysis.is_valid());
    assert!(triple_single.analysis.is_valid());
    assert_ne!(triple.analysis.hand_type, triple_single.analysis.hand_type);
    assert_eq!(triple_single.cards.len(), 4);
}

#[test]
fn beating_a_pair_of_fives() {
    let table = analyze(&of_powers(&[(5, 2)]));
    let hand = of_powers(&[(4, 2), (7, 2), (9, 4)]);
    let beating = find_beating_combos(&hand, &table);

    assert!(beating
        .iter()
        .any(|c| c.analysis.hand_type == HandType::Pair && c.analysis.compare_value() == 7));
    assert!(beating.iter().any(|c| c.analysis.hand_type == HandType::Bomb));
    assert!(!beating
        .iter()
        .any(|c| c.analysis.hand_type == HandType::Single));
    assert!(!beating
        .iter()
        .any(|c| c.analysis.hand_type == HandType::Pair && c.analysis.compare_value() == 4));
}

#[test]
fn two_jokers_enumerate_a_rocket() {
    let hand = of_powers(&[(16, 1), (17, 1)]);
    let combos = find_all_combos(&hand);
    assert!(combos
        .iter()
        .any(|c| c.analysis.hand_type == HandType::Rocket));
}

#[test]
fn two_passes_clear_the_table_and_reset_the_pass_count() {
    let state = GameState::deal_new(Some(16));
    let leader = state.current_turn;
    let opener = state.hands[leader][0];
    let after_play = state.play(leader, &[opener]).unwrap();

    let p1 = after_play.pass(after_play.current_turn).unwrap();
    assert_eq!(p1.pass_count, 1);
    assert!(p1.last_play.is_some());

    let p2 = p1.pass(p1.current_turn).unwrap();
    assert!(p2.last_play.is_none());
    assert_eq!(p2.pass_count, 0);

    // the original leader may now open with anything valid
    assert_eq!(p2.current_turn, leader);
    let reopen = p2.hands[leader][0];
    assert!(p2.play(leader, &[reopen]).is_ok());
}

#[test]
fn finished_game_reports_a_winner_side() {
    let mut session = GameSession::new(Some(31), None);
    session.new_round();
    let mut turns = 0;
    while session.state().phase == GamePhase::Playing && turns < 400 {
        session.advance();
        turns += 1;
    }
    let state = session.state();
    assert_eq!(state.phase, GamePhase::GameOver);
    let winner = state.winner.expect("finished game has a winner");
    assert!(state.hands[winner].is_empty());
    assert!(state.landlord_side_won().is_some());
}

#[test]
fn snapshot_serializes_for_the_render_boundary() {
    let state = GameState::deal_new(Some(2));
    let json = state.to_json();
    assert!(json.contains("\"phase\""));
    assert!(json.contains("\"currentTurn\""));
    let parsed: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);
}
