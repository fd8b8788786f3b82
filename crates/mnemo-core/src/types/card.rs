//! Card scheduling state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::review_log::ReviewLog;

/// Lifecycle state of a card.
///
/// New cards enter the manual learning steps on their first answer and
/// graduate into algorithmic (FSRS) scheduling. A lapse on a Review card
/// sends it through the relearning steps before it returns to Review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum State {
    /// Never answered.
    New = 0,
    /// Progressing through the learning steps.
    Learning = 1,
    /// Graduated; scheduled by the FSRS engine.
    Review = 2,
    /// Lapsed; progressing through the relearning steps.
    Relearning = 3,
}

impl State {
    /// Whether the card is in a manual step phase (Learning or Relearning).
    pub fn is_step_phase(self) -> bool {
        matches!(self, State::Learning | State::Relearning)
    }
}

impl From<State> for u8 {
    fn from(state: State) -> Self {
        state as u8
    }
}

impl TryFrom<u8> for State {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::New),
            1 => Ok(State::Learning),
            2 => Ok(State::Review),
            3 => Ok(State::Relearning),
            other => Err(format!("invalid state value: {other}")),
        }
    }
}

/// A flashcard's scheduling state.
///
/// The card's content payload (field values, template) is owned by the
/// surrounding application; this core only tracks identity and the data
/// the scheduler needs. Stability and difficulty stay clamped to
/// [0.1, 36500] and [1, 10] after every transition, and `review_logs`
/// grows by exactly one entry per answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card identity.
    pub id: Uuid,
    /// When the card should next be presented.
    pub due: DateTime<Utc>,
    /// Stability: days until recall probability decays to the request
    /// retention threshold. 0.0 until the first FSRS-scheduled answer.
    #[serde(rename = "s")]
    pub stability: f64,
    /// Difficulty on a 1-10 scale. 0.0 until the first FSRS-scheduled answer.
    #[serde(rename = "d")]
    pub difficulty: f64,
    /// Number of lapses (Again on a Review card).
    pub lapses: u32,
    /// Total number of answers recorded.
    pub reps: u32,
    /// Current lifecycle state.
    pub state: State,
    /// Timestamp of the most recent answer.
    pub last_review: Option<DateTime<Utc>>,
    /// Position in the learning/relearning step list. Only meaningful
    /// while `state` is Learning or Relearning.
    pub step_index: Option<usize>,
    /// Chronological, append-only answer history.
    pub review_logs: Vec<ReviewLog>,
}

impl Card {
    /// Create a new card due immediately, with no review history.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            lapses: 0,
            reps: 0,
            state: State::New,
            last_review: None,
            step_index: None,
            review_logs: Vec::new(),
        }
    }

    /// Whether the card is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }

    /// Days elapsed since the last review, clamped to be non-negative.
    /// Zero when the card has never been reviewed.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
        match self.last_review {
            Some(last) => {
                let days = (now - last).num_milliseconds() as f64 / 86_400_000.0;
                days.max(0.0)
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_card_defaults() {
        let now = Utc::now();
        let card = Card::new(now);
        assert_eq!(card.state, State::New);
        assert_eq!(card.stability, 0.0);
        assert_eq!(card.difficulty, 0.0);
        assert_eq!(card.reps, 0);
        assert_eq!(card.lapses, 0);
        assert!(card.last_review.is_none());
        assert!(card.step_index.is_none());
        assert!(card.review_logs.is_empty());
        assert!(card.is_due(now));
    }

    #[test]
    fn test_elapsed_days() {
        let now = Utc::now();
        let mut card = Card::new(now);
        assert_eq!(card.elapsed_days(now), 0.0);

        card.last_review = Some(now - Duration::days(3));
        assert!((card.elapsed_days(now) - 3.0).abs() < 1e-9);

        // A last_review in the future clamps to zero rather than going
        // negative.
        card.last_review = Some(now + Duration::days(1));
        assert_eq!(card.elapsed_days(now), 0.0);
    }

    #[test]
    fn test_state_round_trip() {
        for value in 0..4u8 {
            let state = State::try_from(value).unwrap();
            assert_eq!(u8::from(state), value);
        }
        assert!(State::try_from(4).is_err());
    }

    #[test]
    fn test_state_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&State::Relearning).unwrap(), "3");
        let back: State = serde_json::from_str("2").unwrap();
        assert_eq!(back, State::Review);
    }
}
