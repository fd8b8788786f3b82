//! Step & transition controller.
//!
//! Combines the manual learning/relearning step machine with the FSRS
//! engine. Cards move `New -> Learning -> Review <-> Relearning`: while a
//! card is in a step phase its due dates come from the deck's step list,
//! and only graduation (or a direct Review answer) consults the engine.
//!
//! The controller is a pure function over card state: it returns an
//! updated clone plus a requeue flag and leaves persistence to the
//! caller. Every transition appends exactly one review log and bumps
//! `reps` by one.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

use crate::config::DeckSettings;
use crate::error::MnemoResult;
use crate::fsrs::{Fsrs, SchedulingCandidate};
use crate::steps::resolve_steps;
use crate::types::{Card, Rating, ReviewLog, State};

/// Result of applying one answer to a card.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    /// The card after the transition.
    pub card: Card,
    /// Whether the caller should reinsert the card into the active
    /// session queue. True whenever the card is still in a step phase or
    /// the answer was incorrect.
    pub requeue: bool,
}

/// Apply a rated answer to a card at `now`.
///
/// Interval fuzz uses the thread-local RNG; see
/// [`apply_answer_with_rng`] for deterministic scheduling.
pub fn apply_answer(
    card: &Card,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
) -> MnemoResult<ReviewOutcome> {
    apply_answer_with_rng(card, rating, settings, now, &mut rand::thread_rng())
}

/// Apply a rated answer to a card at `now`, with a provided RNG.
///
/// Fails only when the deck's FSRS parameters are malformed.
pub fn apply_answer_with_rng<R: Rng>(
    card: &Card,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MnemoResult<ReviewOutcome> {
    let updated = match card.state {
        State::New | State::Learning | State::Relearning => {
            step_transition(card, rating, settings, now, rng)?
        }
        State::Review => review_transition(card, rating, settings, now, rng)?,
    };

    let requeue = updated.state.is_step_phase() || !rating.is_correct();
    Ok(ReviewOutcome {
        card: updated,
        requeue,
    })
}

/// Handle an answer while the card is in the manual step phase.
fn step_transition<R: Rng>(
    card: &Card,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MnemoResult<Card> {
    let steps = resolve_steps(if card.state == State::Relearning {
        &settings.relearning_steps
    } else {
        &settings.learning_steps
    });

    match rating {
        // Easy graduates immediately, skipping any remaining steps.
        Rating::Easy => graduate(card, Rating::Easy, settings, now, rng),

        // Again resets to the implicit zero-minute step for an immediate
        // re-show.
        Rating::Again => Ok(step_to(card, Rating::Again, 0, steps[0], now)),

        // Good/Hard advance one step; past the end of the list the card
        // graduates as Good.
        Rating::Good | Rating::Hard => {
            let current = match card.state {
                State::New => -1,
                _ => card.step_index.unwrap_or(0) as i64,
            };
            let next = (current + 1) as usize;

            if next >= steps.len() {
                graduate(card, Rating::Good, settings, now, rng)
            } else {
                Ok(step_to(card, rating, next, steps[next], now))
            }
        }
    }
}

/// Move a card to a given step: due in `step_minutes`, state pinned to
/// the step phase, one log appended with the literal rating used.
fn step_to(card: &Card, rating: Rating, step_index: usize, step_minutes: u32, now: DateTime<Utc>) -> Card {
    let due = now + Duration::minutes(step_minutes as i64);
    let state = if card.state == State::New {
        State::Learning
    } else {
        card.state
    };

    let mut updated = card.clone();
    updated.due = due;
    updated.state = state;
    updated.step_index = Some(step_index);
    updated.last_review = Some(now);
    updated.reps += 1;
    updated.review_logs.push(ReviewLog {
        rating,
        state,
        due,
        elapsed_days: 0.0,
        scheduled_days: 0.0,
        review: now,
    });
    updated
}

/// Graduate a card out of the step phase through the FSRS engine.
///
/// The engine is invoked with the state substituted to Review when the
/// card lapsed (Relearning, so its stability history carries forward) or
/// New on a first-time graduation.
fn graduate<R: Rng>(
    card: &Card,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MnemoResult<Card> {
    let fsrs = Fsrs::new(&settings.fsrs_parameters)?;

    let mut staged = card.clone();
    staged.state = if card.state == State::Relearning {
        State::Review
    } else {
        State::New
    };
    if staged.last_review.is_none() {
        staged.last_review = Some(now);
    }

    let schedule = fsrs.schedule_with_rng(&staged, now, rng);
    let candidate = schedule.candidate(rating);
    debug!(
        card_id = %card.id,
        rating = rating.value(),
        interval_days = candidate.scheduled_days,
        "card graduated into FSRS scheduling"
    );

    Ok(adopt_candidate(card, candidate, rating, now, Some(0)))
}

/// Handle an answer on a Review card by adopting the engine's candidate.
fn review_transition<R: Rng>(
    card: &Card,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MnemoResult<Card> {
    let fsrs = Fsrs::new(&settings.fsrs_parameters)?;
    let schedule = fsrs.schedule_with_rng(card, now, rng);
    let candidate = schedule.candidate(rating);

    // A lapse restarts the relearning steps from the top; otherwise the
    // stored step position is left alone.
    let step_index = if rating == Rating::Again {
        Some(0)
    } else {
        card.step_index
    };

    Ok(adopt_candidate(card, candidate, rating, now, step_index))
}

/// Merge an engine candidate back into the card and append its log.
fn adopt_candidate(
    card: &Card,
    candidate: &SchedulingCandidate,
    rating: Rating,
    now: DateTime<Utc>,
    step_index: Option<usize>,
) -> Card {
    let mut updated = card.clone();
    updated.due = candidate.due;
    updated.stability = candidate.stability;
    updated.difficulty = candidate.difficulty;
    updated.reps = candidate.reps;
    updated.lapses = candidate.lapses;
    updated.state = candidate.state;
    updated.last_review = Some(now);
    updated.step_index = step_index;
    updated.review_logs.push(ReviewLog {
        rating,
        state: candidate.state,
        due: candidate.due,
        // The log keeps the real time since the previous answer even when
        // the engine saw a substituted state with zero elapsed time.
        elapsed_days: card.elapsed_days(now),
        scheduled_days: candidate.scheduled_days,
        review: now,
    });
    updated
}
