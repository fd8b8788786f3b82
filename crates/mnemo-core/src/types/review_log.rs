//! Review log entries and answer ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::State;

/// Response-time threshold separating "fast" from "slow" answers, in
/// milliseconds. An answer at or under the threshold counts as fast.
pub const RESPONSE_TIME_THRESHOLD_MS: u64 = 5000;

/// Rating for an answered card (maps to FSRS rating values 1-4).
///
/// - Again (1): incorrect and slow
/// - Hard (2): incorrect but fast
/// - Good (3): correct but slow
/// - Easy (4): correct and fast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rating {
    /// Incorrect, slow response.
    Again = 1,
    /// Incorrect, fast response.
    Hard = 2,
    /// Correct, slow response.
    Good = 3,
    /// Correct, fast response.
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Derive a rating from a binary correctness signal and response latency.
    ///
    /// The grading rule combines the two signals with a fixed 5-second
    /// threshold: correct & fast is `Easy`, correct & slow is `Good`,
    /// incorrect & fast is `Hard`, incorrect & slow is `Again`.
    pub fn from_response(correct: bool, response_ms: u64) -> Self {
        let fast = response_ms <= RESPONSE_TIME_THRESHOLD_MS;
        match (correct, fast) {
            (true, true) => Rating::Easy,
            (true, false) => Rating::Good,
            (false, true) => Rating::Hard,
            (false, false) => Rating::Again,
        }
    }

    /// Whether this rating came from a correct answer.
    pub fn is_correct(self) -> bool {
        matches!(self, Rating::Good | Rating::Easy)
    }

    /// Numeric rating value (1-4).
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating as u8
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(format!("invalid rating value: {other}")),
        }
    }
}

/// Immutable record of one answered review.
///
/// Logs are append-only: once pushed onto a card's `review_logs` they are
/// never mutated or removed. A card's log count always equals its `reps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    /// Rating derived for this answer.
    pub rating: Rating,
    /// Card state after the answer was applied.
    pub state: State,
    /// Due date produced by the answer.
    pub due: DateTime<Utc>,
    /// Days since the previous review at answer time.
    pub elapsed_days: f64,
    /// Length of the newly scheduled interval, in days.
    pub scheduled_days: f64,
    /// Timestamp of the answer itself.
    pub review: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_derivation() {
        assert_eq!(Rating::from_response(true, 3000), Rating::Easy);
        assert_eq!(Rating::from_response(true, 8000), Rating::Good);
        assert_eq!(Rating::from_response(false, 3000), Rating::Hard);
        assert_eq!(Rating::from_response(false, 8000), Rating::Again);
    }

    #[test]
    fn test_rating_derivation_at_threshold() {
        // Exactly 5000ms still counts as fast.
        assert_eq!(Rating::from_response(true, 5000), Rating::Easy);
        assert_eq!(Rating::from_response(false, 5000), Rating::Hard);
        assert_eq!(Rating::from_response(true, 5001), Rating::Good);
    }

    #[test]
    fn test_rating_is_correct() {
        assert!(!Rating::Again.is_correct());
        assert!(!Rating::Hard.is_correct());
        assert!(Rating::Good.is_correct());
        assert!(Rating::Easy.is_correct());
    }

    #[test]
    fn test_rating_round_trip() {
        for rating in Rating::ALL {
            assert_eq!(Rating::try_from(rating.value()), Ok(rating));
        }
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(5).is_err());
    }

    #[test]
    fn test_rating_serializes_as_integer() {
        let json = serde_json::to_string(&Rating::Good).unwrap();
        assert_eq!(json, "3");
        let back: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(back, Rating::Easy);
    }
}
