//! Interactive study session over one deck's queue.
//!
//! Owns the ordered queue, applies answers through the transition
//! controller, and keeps a session-scoped undo stack. The session never
//! persists anything itself: every answer hands the updated card back to
//! the caller, and an undo hands back the prior card state to write
//! through. Exactly one card (the queue head) is presentable at a time.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::DeckSettings;
use crate::error::MnemoResult;
use crate::queue::{build_queue_with_rng, sort_by_due};
use crate::scheduler::{apply_answer_with_rng, ReviewOutcome};
use crate::types::{Card, Rating};

/// One undoable answer: the queue as it stood before the answer and the
/// card state the answer replaced.
#[derive(Debug, Clone)]
struct HistoryEntry {
    queue: Vec<Card>,
    card_before: Card,
}

/// A single study session.
///
/// Built from a deck's cards and settings; abandoned sessions simply drop
/// their queue and undo stack, while any card updates the caller already
/// persisted remain.
#[derive(Debug)]
pub struct StudySession<R: Rng = StdRng> {
    settings: DeckSettings,
    queue: Vec<Card>,
    history: Vec<HistoryEntry>,
    rng: R,
}

impl StudySession<StdRng> {
    /// Start a session with an entropy-seeded RNG.
    pub fn new(cards: &[Card], settings: DeckSettings, now: DateTime<Utc>) -> Self {
        Self::with_rng(cards, settings, now, StdRng::from_entropy())
    }
}

impl<R: Rng> StudySession<R> {
    /// Start a session with a provided RNG, for deterministic scheduling.
    pub fn with_rng(cards: &[Card], settings: DeckSettings, now: DateTime<Utc>, mut rng: R) -> Self {
        let queue = build_queue_with_rng(cards, &settings, now, &mut rng);
        debug!(cards = queue.len(), "study session started");
        Self {
            settings,
            queue,
            history: Vec::new(),
            rng,
        }
    }

    /// The card at the head of the queue, if any.
    pub fn current(&self) -> Option<&Card> {
        self.queue.first()
    }

    /// When the head card becomes presentable, if that lies in the
    /// future. The session never advances time itself; the caller gates
    /// presentation (a waiting screen) on this value.
    pub fn waiting_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.current()
            .map(|card| card.due)
            .filter(|&due| due > now)
    }

    /// Number of cards left in the queue.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Whether every card has been cleared from the queue.
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether an answer can be undone.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Answer the head card with a correctness signal and response
    /// latency. Returns the transition outcome; the caller persists
    /// `outcome.card`. `Ok(None)` when the queue is empty.
    ///
    /// A still-learning or incorrectly answered card is reinserted and
    /// the queue re-sorted ascending by due date, so the most urgent card
    /// is always next.
    pub fn answer(
        &mut self,
        correct: bool,
        response_ms: u64,
        now: DateTime<Utc>,
    ) -> MnemoResult<Option<ReviewOutcome>> {
        let Some(head) = self.queue.first().cloned() else {
            return Ok(None);
        };

        let rating = Rating::from_response(correct, response_ms);
        let outcome = apply_answer_with_rng(&head, rating, &self.settings, now, &mut self.rng)?;

        self.history.push(HistoryEntry {
            queue: self.queue.clone(),
            card_before: head,
        });

        self.queue.remove(0);
        if outcome.requeue {
            self.queue.push(outcome.card.clone());
        }
        sort_by_due(&mut self.queue);

        Ok(Some(outcome))
    }

    /// Undo the most recent answer: the queue snapshot is restored
    /// verbatim and the prior card state is returned for the caller to
    /// persist back. No recomputation happens. `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<Card> {
        let entry = self.history.pop()?;
        self.queue = entry.queue;
        debug!(card_id = %entry.card_before.id, "answer undone");
        Some(entry.card_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeckPreset;
    use crate::types::State;
    use chrono::Duration;

    fn session_over(cards: &[Card], now: DateTime<Utc>) -> StudySession<StdRng> {
        StudySession::with_rng(
            cards,
            DeckPreset::Balanced.settings(),
            now,
            StdRng::seed_from_u64(21),
        )
    }

    #[test]
    fn test_answer_pops_and_requeues() {
        let now = Utc::now();
        let cards: Vec<Card> = (0..2).map(|_| Card::new(now)).collect();
        let mut session = session_over(&cards, now);
        assert_eq!(session.remaining(), 2);

        // Correct but slow => Good: a new card enters the learning steps
        // and stays in the queue.
        let outcome = session.answer(true, 9000, now).unwrap().unwrap();
        assert_eq!(outcome.card.state, State::Learning);
        assert!(outcome.requeue);
        assert_eq!(session.remaining(), 2);
    }

    #[test]
    fn test_easy_answers_drain_the_queue() {
        let now = Utc::now();
        let cards: Vec<Card> = (0..3).map(|_| Card::new(now)).collect();
        let mut session = session_over(&cards, now);

        // Correct and fast => Easy: immediate graduation, no requeue.
        for _ in 0..3 {
            let outcome = session.answer(true, 1000, now).unwrap().unwrap();
            assert_eq!(outcome.card.state, State::Review);
            assert!(!outcome.requeue);
        }
        assert!(session.is_complete());
        assert!(session.answer(true, 1000, now).unwrap().is_none());
    }

    #[test]
    fn test_queue_stays_sorted_after_requeue() {
        let now = Utc::now();
        let cards: Vec<Card> = (0..4).map(|_| Card::new(now)).collect();
        let mut session = session_over(&cards, now);

        for _ in 0..6 {
            session.answer(false, 9000, now).unwrap();
            for pair in session.queue.windows(2) {
                assert!(pair[0].due <= pair[1].due);
            }
        }
    }

    #[test]
    fn test_undo_restores_queue_and_card() {
        let now = Utc::now();
        let cards: Vec<Card> = (0..2).map(|_| Card::new(now)).collect();
        let mut session = session_over(&cards, now);
        assert!(!session.can_undo());

        let before: Vec<_> = session.queue.iter().map(|c| c.id).collect();
        let head_before = session.current().unwrap().clone();

        let outcome = session.answer(true, 1000, now).unwrap().unwrap();
        assert_ne!(outcome.card, head_before);
        assert!(session.can_undo());

        let restored = session.undo().unwrap();
        // Exact prior state, no recomputation.
        assert_eq!(restored, head_before);
        let after: Vec<_> = session.queue.iter().map(|c| c.id).collect();
        assert_eq!(after, before);
        assert!(!session.can_undo());
        assert!(session.undo().is_none());
    }

    #[test]
    fn test_waiting_gate_for_future_head() {
        let now = Utc::now();
        let cards = vec![Card::new(now)];
        let mut session = session_over(&cards, now);
        assert!(session.waiting_until(now).is_none());

        // Good on a new card lands on the implicit 0m step (due now),
        // then the next Good schedules the 1m step into the future.
        session.answer(true, 9000, now).unwrap();
        assert!(session.waiting_until(now).is_none());
        session.answer(true, 9000, now).unwrap();

        let due = session.waiting_until(now).unwrap();
        assert_eq!(due, now + Duration::minutes(1));
        assert!(session.waiting_until(now + Duration::minutes(2)).is_none());
    }
}
