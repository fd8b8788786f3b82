//! Core scheduling types.

mod card;
mod review_log;

pub use card::{Card, State};
pub use review_log::{Rating, ReviewLog};
