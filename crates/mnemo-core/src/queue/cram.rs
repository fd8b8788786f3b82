//! Cram mode: an ephemeral re-drill of today's cards.
//!
//! Cramming never touches scheduling state. No rating, no FSRS, no
//! review logs; a correct answer drops the card from the drill, an
//! incorrect answer sends it to the back of the line.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::start_of_day;
use crate::types::Card;

/// An in-memory cram drill over the cards reviewed today.
#[derive(Debug, Clone)]
pub struct CramSession {
    queue: VecDeque<Card>,
}

impl CramSession {
    /// Start a cram session over every card whose last review falls on
    /// the current day, in shuffled order.
    pub fn new(cards: &[Card], now: DateTime<Utc>) -> Self {
        Self::with_rng(cards, now, &mut rand::thread_rng())
    }

    /// Start a cram session with a provided RNG.
    pub fn with_rng<R: Rng>(cards: &[Card], now: DateTime<Utc>, rng: &mut R) -> Self {
        let day_start = start_of_day(now);
        let mut pool: Vec<Card> = cards
            .iter()
            .filter(|c| c.last_review.is_some_and(|last| last >= day_start))
            .cloned()
            .collect();
        pool.shuffle(rng);

        Self { queue: pool.into() }
    }

    /// The card currently at the head of the drill.
    pub fn current(&self) -> Option<&Card> {
        self.queue.front()
    }

    /// Answer the head card: correct removes it, incorrect moves it to
    /// the tail. No scheduling state changes. Returns the answered card.
    pub fn answer(&mut self, correct: bool) -> Option<Card> {
        let card = self.queue.pop_front()?;
        if !correct {
            self.queue.push_back(card.clone());
        }
        Some(card)
    }

    /// Number of cards still in the drill.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Whether the drill has been emptied.
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }
}
