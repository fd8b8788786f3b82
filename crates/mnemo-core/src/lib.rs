//! mnemo-core - Spaced-repetition scheduling core.
//!
//! This crate is the scheduling engine behind mnemo: the FSRS-6 memory
//! model, the learning/relearning step machine, the daily study-queue
//! builder, and the session undo stack. It is a pure library: the
//! surrounding application supplies cards and deck settings and persists
//! whatever comes back.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use mnemo_core::{Card, DeckSettings, StudySession};
//!
//! let now = Utc::now();
//! let cards: Vec<Card> = (0..3).map(|_| Card::new(now)).collect();
//!
//! let mut session = StudySession::new(&cards, DeckSettings::default(), now);
//! while let Some(outcome) = session.answer(true, 1200, Utc::now()).unwrap() {
//!     // persist outcome.card ...
//! }
//! assert!(session.is_complete());
//! ```

pub mod config;
pub mod error;
pub mod fsrs;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod steps;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{DeckPreset, DeckSettings, FsrsParameters, DEFAULT_WEIGHTS, WEIGHT_COUNT};
pub use error::{MnemoError, MnemoResult};
pub use fsrs::{Fsrs, Schedule, SchedulingCandidate};
pub use queue::{build_queue, build_queue_with_rng, CramSession};
pub use scheduler::{apply_answer, apply_answer_with_rng, ReviewOutcome};
pub use session::StudySession;
pub use traits::{optimize_weights, WeightOptimizer, MIN_REVIEWS_FOR_OPTIMIZATION};
pub use types::{Card, Rating, ReviewLog, State};
