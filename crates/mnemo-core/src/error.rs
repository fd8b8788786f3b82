//! Error types for mnemo scheduling operations.

use thiserror::Error;

/// Result type alias for mnemo operations.
pub type MnemoResult<T> = Result<T, MnemoError>;

/// Main error type for the scheduling core.
#[derive(Error, Debug)]
pub enum MnemoError {
    /// Scheduler configuration is invalid (e.g. malformed weight vector).
    ///
    /// Fatal at construction time; callers must not proceed with a
    /// misconfigured engine.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Not enough review history to run parameter optimization.
    #[error("Insufficient review data: {actual} logs available, {required} required")]
    InsufficientData { required: usize, actual: usize },

    /// The external weight optimizer failed.
    #[error("Optimization error: {message}")]
    Optimization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MnemoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an optimization error without an underlying source.
    pub fn optimization(message: impl Into<String>) -> Self {
        Self::Optimization {
            message: message.into(),
            source: None,
        }
    }
}
