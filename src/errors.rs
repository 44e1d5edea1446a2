//! Error handling module for the session timer.

use thiserror::Error;

/// Custom error type for timer and session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Invalid argument provided, e.g. a negative duration.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A session handler failed.
    #[error("Callback execution failed: {0}")]
    CallbackError(String),
}
