//! Error types for quarry.

use std::time::Duration;

use thiserror::Error;

use crate::types::Chunk;

/// Result type alias for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Errors that can occur while partitioning or scanning a range.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// Malformed arguments, rejected before any worker starts
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration source held an unusable value
    #[error("configuration error: {0}")]
    Config(String),

    /// A chunk evaluation faulted
    #[error("worker failed on chunk {chunk}: {message}")]
    WorkerFailure {
        /// Chunk whose evaluation faulted.
        chunk: Chunk,
        /// Panic payload rendered as text.
        message: String,
    },

    /// The run was cancelled with chunks still outstanding
    #[error("scan cancelled before all chunks completed")]
    Cancelled,

    /// The join barrier exceeded its deadline
    #[error("scan did not finish within {0:?}")]
    Timeout(Duration),

    /// The blackboard lock was poisoned
    #[error("blackboard lock poisoned")]
    LockPoisoned,

    /// A worker thread could not be built or died outside a chunk evaluation
    #[error("worker thread error: {0}")]
    Thread(String),

    /// I/O error (thread spawn)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuarryError {
    /// Shorthand for [`QuarryError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether this error was caused by caller input rather than the run itself.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::Config(_))
    }
}
