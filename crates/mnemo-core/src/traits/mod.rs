//! Collaborator traits implemented outside the scheduling core.

mod optimizer;

pub use optimizer::{optimize_weights, WeightOptimizer, MIN_REVIEWS_FOR_OPTIMIZATION};
