//! FSRS-6 memory model (21 parameters).
//!
//! Implements the Free Spaced Repetition Scheduler's stability,
//! difficulty and retrievability math and turns stability into concrete
//! review intervals:
//!
//! ```text
//! R(t, S) = (1 + FACTOR * t / S) ^ DECAY     retrievability
//! I(r, S) = S * (r^(1/DECAY) - 1) / FACTOR   interval for target recall r
//! ```
//!
//! The engine is a pure function over card state: `schedule` produces a
//! candidate next state for every possible rating and never mutates its
//! input. Interval fuzz is the only randomized part and can be driven by
//! an injected RNG for reproducible tests.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::{FsrsParameters, WEIGHT_COUNT};
use crate::error::{MnemoError, MnemoResult};
use crate::types::{Card, Rating, State};

/// Lower bound on stability, in days.
const MIN_STABILITY: f64 = 0.1;
/// Upper bound on stability, in days (100 years).
const MAX_STABILITY: f64 = 36500.0;

/// Fuzz bands applied cumulatively over the raw interval: `(start, end,
/// factor)` contributes `factor * (min(interval, end) - start)` days of
/// spread for the portion of the interval inside the band.
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.10),
    (20.0, f64::INFINITY, 0.05),
];

/// Candidate next scheduling state for one rating.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingCandidate {
    /// Next due date.
    pub due: DateTime<Utc>,
    /// Updated stability, rounded to 8 decimal places.
    pub stability: f64,
    /// Updated difficulty, rounded to 8 decimal places.
    pub difficulty: f64,
    /// Resulting lifecycle state.
    pub state: State,
    /// Review count after this answer.
    pub reps: u32,
    /// Lapse count after this answer.
    pub lapses: u32,
    /// Days elapsed since the previous review, as used by the model.
    pub elapsed_days: f64,
    /// Scheduled interval length in days (0 while in a step phase).
    pub scheduled_days: f64,
    /// Review timestamp this candidate was computed for.
    pub last_review: DateTime<Utc>,
}

/// Candidate next states for all four ratings of one card at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub again: SchedulingCandidate,
    pub hard: SchedulingCandidate,
    pub good: SchedulingCandidate,
    pub easy: SchedulingCandidate,
}

impl Schedule {
    /// Candidate for a given rating.
    pub fn candidate(&self, rating: Rating) -> &SchedulingCandidate {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

/// The FSRS-6 scheduling engine.
///
/// Constructed from deck parameters; construction fails when the weight
/// vector does not hold exactly 21 values.
#[derive(Debug, Clone)]
pub struct Fsrs {
    w: [f64; WEIGHT_COUNT],
    maximum_interval: u32,
    decay: f64,
    factor: f64,
    interval_modifier: f64,
}

impl Fsrs {
    /// Build an engine from deck parameters.
    pub fn new(params: &FsrsParameters) -> MnemoResult<Self> {
        let w: [f64; WEIGHT_COUNT] = params.w.as_slice().try_into().map_err(|_| {
            MnemoError::config(format!(
                "expected {} FSRS weights, got {}",
                WEIGHT_COUNT,
                params.w.len()
            ))
        })?;

        // decay = -w20; factor = e^(ln 0.9 / decay) - 1, so that
        // R(S, S) = 0.9 by construction.
        let decay = -w[20];
        let factor = (0.9_f64.ln() / decay).exp() - 1.0;
        let interval_modifier = (params.request_retention.powf(1.0 / decay) - 1.0) / factor;

        Ok(Self {
            w,
            maximum_interval: params.maximum_interval,
            decay,
            factor,
            interval_modifier,
        })
    }

    /// Current retrievability of a card at `now`.
    ///
    /// Forced to 0 for New cards and whenever stability is not positive,
    /// so the recall/forget formulas never see a NaN.
    pub fn retrievability(&self, card: &Card, now: DateTime<Utc>) -> f64 {
        if card.state == State::New || card.stability <= 0.0 {
            return 0.0;
        }
        let elapsed = card.elapsed_days(now);
        (1.0 + self.factor * elapsed / card.stability).powf(self.decay)
    }

    /// Compute the candidate next state for every rating.
    ///
    /// Interval fuzz uses the thread-local RNG; see [`Fsrs::schedule_with_rng`]
    /// for deterministic scheduling.
    pub fn schedule(&self, card: &Card, now: DateTime<Utc>) -> Schedule {
        self.schedule_with_rng(card, now, &mut rand::thread_rng())
    }

    /// Compute the candidate next state for every rating with a provided RNG.
    pub fn schedule_with_rng<R: Rng>(
        &self,
        card: &Card,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Schedule {
        let elapsed_days = if card.state == State::New {
            0.0
        } else {
            card.elapsed_days(now)
        };
        let retrievability = self.retrievability(card, now);

        let mut build = |rating: Rating| {
            self.candidate_for(card, rating, now, elapsed_days, retrievability, rng)
        };

        Schedule {
            again: build(Rating::Again),
            hard: build(Rating::Hard),
            good: build(Rating::Good),
            easy: build(Rating::Easy),
        }
    }

    fn candidate_for<R: Rng>(
        &self,
        card: &Card,
        rating: Rating,
        now: DateTime<Utc>,
        elapsed_days: f64,
        retrievability: f64,
        rng: &mut R,
    ) -> SchedulingCandidate {
        let mut stability = card.stability;
        let mut difficulty = card.difficulty;
        let mut lapses = card.lapses;

        let state = match card.state {
            State::New => {
                // S0(G) = w[G-1], D0(G) = w4 - e^((G-1)*w5) + 1
                stability = self.w[rating.value() as usize - 1].max(MIN_STABILITY);
                difficulty = self.init_difficulty(rating);
                if rating == Rating::Again {
                    State::Learning
                } else {
                    State::Review
                }
            }
            State::Learning | State::Relearning => {
                // Step phases keep S/D untouched; the transition
                // controller substitutes New or Review before calling the
                // engine at graduation time.
                if rating == Rating::Again {
                    State::Relearning
                } else {
                    State::Review
                }
            }
            State::Review => {
                if rating == Rating::Again {
                    // Lapse: S' = min(S_forget, S / e^(w17*w18))
                    difficulty = self.next_difficulty(card.difficulty, Rating::Again);
                    let s_forget =
                        self.next_forget_stability(card.difficulty, card.stability, retrievability);
                    let s_short_term = card.stability / (self.w[17] * self.w[18]).exp();
                    stability = s_forget.min(s_short_term).max(MIN_STABILITY);
                    lapses += 1;
                    State::Relearning
                } else {
                    difficulty = self.next_difficulty(card.difficulty, rating);
                    stability = self.next_recall_stability(
                        card.difficulty,
                        card.stability,
                        retrievability,
                        rating,
                    );
                    State::Review
                }
            }
        };

        let interval = if state == State::Review {
            let raw = self.next_interval(stability);
            self.apply_fuzz_with_rng(raw, elapsed_days, rng)
        } else {
            0
        };

        SchedulingCandidate {
            due: now + Duration::days(interval as i64),
            stability: round8(stability),
            difficulty: round8(difficulty),
            state,
            reps: card.reps + 1,
            lapses,
            elapsed_days,
            scheduled_days: interval as f64,
            last_review: now,
        }
    }

    /// D0(G) = w4 - e^((G-1)*w5) + 1, clamped to [1, 10].
    fn init_difficulty(&self, rating: Rating) -> f64 {
        let d = self.w[4] - ((rating.value() as f64 - 1.0) * self.w[5]).exp() + 1.0;
        d.clamp(1.0, 10.0)
    }

    /// Linear damping: a difficulty delta shrinks as D approaches 10.
    fn linear_damping(&self, delta_d: f64, d: f64) -> f64 {
        delta_d * (10.0 - d) / 9.0
    }

    /// Mean reversion toward D0(Easy): w7 * init + (1 - w7) * current.
    fn mean_reversion(&self, init: f64, current: f64) -> f64 {
        self.w[7] * init + (1.0 - self.w[7]) * current
    }

    /// D' = mean_reversion(D0(4), D + linear_damping(-w6 * (G - 3), D)),
    /// clamped to [1, 10].
    fn next_difficulty(&self, d: f64, rating: Rating) -> f64 {
        let delta_d = -self.w[6] * (rating.value() as f64 - 3.0);
        let next_d = d + self.linear_damping(delta_d, d);
        self.mean_reversion(self.init_difficulty(Rating::Easy), next_d)
            .clamp(1.0, 10.0)
    }

    /// S' = S * (1 + e^w8 * (11-D) * S^-w9 * (e^((1-R)*w10) - 1)
    ///            * hard_penalty * easy_bonus), clamped to [0.1, 36500].
    fn next_recall_stability(&self, d: f64, s: f64, r: f64, rating: Rating) -> f64 {
        let hard_penalty = if rating == Rating::Hard { self.w[15] } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { self.w[16] } else { 1.0 };

        let new_s = s * (1.0
            + self.w[8].exp()
                * (11.0 - d)
                * s.powf(-self.w[9])
                * (((1.0 - r) * self.w[10]).exp() - 1.0)
                * hard_penalty
                * easy_bonus);

        new_s.clamp(MIN_STABILITY, MAX_STABILITY)
    }

    /// S'f = w11 * D^-w12 * ((S+1)^w13 - 1) * e^((1-R)*w14),
    /// clamped to [0.1, 36500].
    fn next_forget_stability(&self, d: f64, s: f64, r: f64) -> f64 {
        let new_s = self.w[11]
            * d.powf(-self.w[12])
            * ((s + 1.0).powf(self.w[13]) - 1.0)
            * (((1.0 - r) * self.w[14]).exp());

        new_s.clamp(MIN_STABILITY, MAX_STABILITY)
    }

    /// Raw interval in days: round(S * modifier) clamped to
    /// [1, maximum_interval].
    fn next_interval(&self, stability: f64) -> u32 {
        let interval = (stability * self.interval_modifier).round();
        interval.max(1.0).min(self.maximum_interval as f64) as u32
    }

    /// Randomize an interval within a bounded band to avoid review-date
    /// clustering. Intervals under 2.5 days are never fuzzed.
    fn apply_fuzz_with_rng<R: Rng>(&self, interval: u32, elapsed_days: f64, rng: &mut R) -> u32 {
        let ivl = interval as f64;
        if ivl < 2.5 {
            return interval;
        }

        let mut delta = 1.0;
        for (start, end, factor) in FUZZ_RANGES {
            delta += factor * (ivl.min(end) - start).max(0.0);
        }

        let mut min_ivl = ((ivl - delta).round() as i64).max(2);
        let max_ivl = ((ivl + delta).round() as i64).min(self.maximum_interval as i64);

        // Never fuzz an interval back to or before the elapsed time; the
        // card would come due in the past.
        if ivl > elapsed_days {
            min_ivl = min_ivl.max(elapsed_days as i64 + 1);
        }
        min_ivl = min_ivl.min(max_ivl);

        rng.gen_range(min_ivl..=max_ivl) as u32
    }
}

/// Round to 8 decimal places for stable persistence.
fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}
