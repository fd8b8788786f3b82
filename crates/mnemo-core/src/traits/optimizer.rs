//! Weight optimizer trait and entry point.
//!
//! Parameter fitting is heavy, long-running work and lives outside this
//! crate; the core only defines the async contract and the cheap
//! precondition check. Implementations are expected to run off the
//! calling thread so an active study session stays responsive; the core
//! makes no fairness or retry guarantees toward them.

use async_trait::async_trait;
use tracing::info;

use crate::config::WEIGHT_COUNT;
use crate::error::{MnemoError, MnemoResult};
use crate::types::ReviewLog;

/// Minimum review history required before optimization is attempted.
pub const MIN_REVIEWS_FOR_OPTIMIZATION: usize = 10;

/// Fits a 21-weight FSRS parameter vector to a deck's review history.
#[async_trait]
pub trait WeightOptimizer: Send + Sync {
    /// Compute optimized weights from the given review logs.
    async fn optimize(&self, logs: &[ReviewLog]) -> MnemoResult<[f64; WEIGHT_COUNT]>;
}

/// Run weight optimization for a deck's review history.
///
/// Rejects histories of fewer than [`MIN_REVIEWS_FOR_OPTIMIZATION`] logs
/// with [`MnemoError::InsufficientData`] before the optimizer is ever
/// invoked, leaving settings untouched.
pub async fn optimize_weights(
    optimizer: &dyn WeightOptimizer,
    logs: &[ReviewLog],
) -> MnemoResult<[f64; WEIGHT_COUNT]> {
    if logs.len() < MIN_REVIEWS_FOR_OPTIMIZATION {
        return Err(MnemoError::InsufficientData {
            required: MIN_REVIEWS_FOR_OPTIMIZATION,
            actual: logs.len(),
        });
    }

    info!(logs = logs.len(), "starting weight optimization");
    let weights = optimizer.optimize(logs).await?;
    info!("weight optimization complete");
    Ok(weights)
}
