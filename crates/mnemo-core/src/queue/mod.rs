//! Daily study queue construction.
//!
//! Selects which cards a session presents and in what order, under the
//! deck's daily new/review limits. Admission is grouped (due learning
//! cards first, then capped reviews, then capped new cards) but the
//! final ascending-due sort is the authoritative ordering; grouping only
//! decides who gets in and the random tie-break among equals.

mod cram;

pub use cram::CramSession;

use chrono::{DateTime, NaiveTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::DeckSettings;
use crate::types::{Card, State};

/// UTC midnight of the day containing `now`.
pub(crate) fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Build the ordered study queue for one session.
///
/// Shuffling uses the thread-local RNG; see [`build_queue_with_rng`] for
/// deterministic queues.
pub fn build_queue(cards: &[Card], settings: &DeckSettings, now: DateTime<Utc>) -> Vec<Card> {
    build_queue_with_rng(cards, settings, now, &mut rand::thread_rng())
}

/// Build the ordered study queue for one session with a provided RNG.
pub fn build_queue_with_rng<R: Rng>(
    cards: &[Card],
    settings: &DeckSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Card> {
    let day_start = start_of_day(now);

    // Due learning/relearning cards are always shown, regardless of the
    // daily limits.
    let mut learning_queue: Vec<Card> = cards
        .iter()
        .filter(|c| c.state.is_step_phase() && c.is_due(now))
        .cloned()
        .collect();
    learning_queue.shuffle(rng);

    // Cards whose first-ever answer happened today count against the new
    // limit, so reopening a session cannot introduce endless new cards.
    let introduced_today = cards
        .iter()
        .filter(|c| {
            c.review_logs
                .first()
                .is_some_and(|log| log.review >= day_start && log.review <= now)
        })
        .count() as u32;
    let remaining_new_limit = settings.new_cards_per_day.saturating_sub(introduced_today);

    // Reviews already answered today consume review slots. The first-ever
    // log of a card is an introduction, not a review, and is skipped.
    let reviews_done_today: u32 = cards
        .iter()
        .map(|c| {
            c.review_logs
                .iter()
                .skip(1)
                .filter(|log| {
                    log.review >= day_start
                        && matches!(log.state, State::Review | State::Relearning)
                })
                .count() as u32
        })
        .sum();
    let remaining_review_slots = settings
        .reviews_per_day
        .saturating_sub(reviews_done_today)
        .saturating_sub(learning_queue.len() as u32);

    // Oldest-due reviews get the remaining slots, then shuffle within the
    // admitted set.
    let mut review_due: Vec<Card> = cards
        .iter()
        .filter(|c| c.state == State::Review && c.is_due(now))
        .cloned()
        .collect();
    review_due.sort_by(|a, b| a.due.cmp(&b.due));
    review_due.truncate(remaining_review_slots as usize);
    review_due.shuffle(rng);

    // Oldest-created new cards first (input order preserves creation
    // order), so decks keep their chapter/lesson progression.
    let mut new_queue: Vec<Card> = cards
        .iter()
        .filter(|c| c.state == State::New)
        .take(remaining_new_limit as usize)
        .cloned()
        .collect();
    new_queue.shuffle(rng);

    debug!(
        learning = learning_queue.len(),
        reviews = review_due.len(),
        new = new_queue.len(),
        introduced_today,
        reviews_done_today,
        "built study queue"
    );

    let mut queue = learning_queue;
    queue.extend(review_due);
    queue.extend(new_queue);
    sort_by_due(&mut queue);
    queue
}

/// Sort a queue ascending by due date. This is the authoritative session
/// order, applied after building and after every requeue.
pub(crate) fn sort_by_due(queue: &mut [Card]) {
    queue.sort_by(|a, b| a.due.cmp(&b.due));
}
