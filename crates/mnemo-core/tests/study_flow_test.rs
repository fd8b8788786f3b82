//! End-to-end study flow tests.
//!
//! Drives full sessions through the public API the way the surrounding
//! application would: build a session, answer cards, persist the
//! returned updates, and verify the scheduling invariants hold at every
//! step.

use chrono::{DateTime, Duration, TimeZone, Utc};
use mnemo_core::{Card, CramSession, DeckPreset, DeckSettings, State, StudySession};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
}

fn session(cards: &[Card], settings: DeckSettings, now: DateTime<Utc>, seed: u64) -> StudySession<StdRng> {
    StudySession::with_rng(cards, settings, now, StdRng::seed_from_u64(seed))
}

fn assert_invariants(card: &Card, answered_at: DateTime<Utc>) {
    assert_eq!(card.reps as usize, card.review_logs.len());
    assert!(card.due >= answered_at, "card scheduled into the past");
    if card.state != State::New {
        if card.stability != 0.0 {
            assert!((0.1..=36500.0).contains(&card.stability));
        }
        if card.difficulty != 0.0 {
            assert!((1.0..=10.0).contains(&card.difficulty));
        }
    }
    for pair in card.review_logs.windows(2) {
        assert!(pair[0].review <= pair[1].review, "logs out of order");
    }
}

#[test]
fn test_full_session_over_new_deck() {
    let now = noon();
    let cards: Vec<Card> = (0..5).map(|_| Card::new(now)).collect();
    let mut store: HashMap<_, _> = cards.iter().map(|c| (c.id, c.clone())).collect();

    let mut session = session(&cards, DeckPreset::Balanced.settings(), now, 3);
    assert_eq!(session.remaining(), 5);

    // Mixed answers; clock nudges forward so step cards come due again.
    let mut clock = now;
    let mut answers = 0;
    while !session.is_complete() {
        let correct = answers % 3 != 0;
        let outcome = session.answer(correct, 2000, clock).unwrap().unwrap();
        assert_invariants(&outcome.card, clock);
        store.insert(outcome.card.id, outcome.card.clone());

        clock += Duration::minutes(11);
        answers += 1;
        assert!(answers < 200, "session failed to terminate");
    }

    // Every card graduated out of the queue into Review scheduling.
    for card in store.values() {
        assert_eq!(card.state, State::Review);
        assert!(card.reps >= 1);
    }
}

#[test]
fn test_incorrect_answers_keep_cards_in_session() {
    let now = noon();
    let cards: Vec<Card> = (0..3).map(|_| Card::new(now)).collect();
    let mut session = session(&cards, DeckPreset::Balanced.settings(), now, 8);

    // Every miss requeues, so the queue never shrinks.
    let mut clock = now;
    for _ in 0..9 {
        session.answer(false, 9000, clock).unwrap().unwrap();
        assert_eq!(session.remaining(), 3);
        clock += Duration::minutes(1);
    }
}

#[test]
fn test_undo_round_trips_through_persistence() {
    let now = noon();
    let cards: Vec<Card> = (0..2).map(|_| Card::new(now)).collect();
    let mut store: HashMap<_, _> = cards.iter().map(|c| (c.id, c.clone())).collect();
    let mut session = session(&cards, DeckPreset::Balanced.settings(), now, 13);

    let outcome = session.answer(true, 1000, now).unwrap().unwrap();
    store.insert(outcome.card.id, outcome.card.clone());

    // Undo hands back the exact prior state to write through.
    let restored = session.undo().unwrap();
    let original = cards.iter().find(|c| c.id == restored.id).unwrap();
    assert_eq!(&restored, original);
    store.insert(restored.id, restored);

    assert_eq!(session.remaining(), 2);
    assert_eq!(store.len(), 2);
    assert!(store.values().all(|c| c.review_logs.is_empty()));
}

#[test]
fn test_review_day_respects_limits() {
    let now = noon();
    let settings = {
        let mut s = DeckPreset::Balanced.settings();
        s.new_cards_per_day = 2;
        s.reviews_per_day = 3;
        s
    };

    // A backlog bigger than both limits.
    let mut cards: Vec<Card> = (0..10).map(|_| Card::new(now)).collect();
    for card in cards.iter_mut().take(6) {
        card.state = State::Review;
        card.stability = 4.0;
        card.difficulty = 5.0;
        card.due = now - Duration::days(2);
        card.last_review = Some(now - Duration::days(6));
    }

    let session = session(&cards, settings, now, 2);
    assert_eq!(session.remaining(), 5); // 3 reviews + 2 new
}

#[test]
fn test_cram_after_study_day() {
    let now = noon();
    let cards: Vec<Card> = (0..5).map(|_| Card::new(now)).collect();
    let mut studied: Vec<Card> = Vec::new();

    let mut session = session(&cards, DeckPreset::Balanced.settings(), now, 17);
    while let Some(outcome) = session.answer(true, 1000, now).unwrap() {
        studied.push(outcome.card);
    }

    // Everything studied today is eligible for cramming.
    let mut cram = CramSession::with_rng(&studied, now, &mut StdRng::seed_from_u64(17));
    assert_eq!(cram.remaining(), 5);

    // Cramming never touches scheduling state.
    let before: HashMap<_, _> = studied.iter().map(|c| (c.id, c.clone())).collect();
    cram.answer(false);
    cram.answer(false);
    while let Some(card) = cram.answer(true) {
        assert_eq!(&card, &before[&card.id]);
    }
    assert!(cram.is_complete());
}
