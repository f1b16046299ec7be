//! StorageError - Provisioning Error Taxonomy
//!
//! TigerStyle: Explicit error classes; classification drives retry behavior.
//!
//! Errors are `Clone` so a single memoized failure can be handed to every
//! waiter of the same initialization wave.

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced while provisioning or talking to the table backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Malformed connection descriptor or table name. Never retried.
    #[error("invalid storage configuration: {0}")]
    Configuration(String),

    /// Timeout, throttling, or connectivity failure. Retried with backoff.
    #[error("transient backend failure: {0}")]
    Transient(String),

    /// Authorization failure or backend-rejected request. Never retried.
    #[error("permanent backend failure: {0}")]
    Permanent(String),

    /// Retry budget spent; wraps the last transient failure observed.
    #[error("provisioning exhausted after {attempts} attempts")]
    Exhausted {
        /// Total attempts made before giving up.
        attempts: u32,
        /// The final transient error.
        #[source]
        last: Box<StorageError>,
    },
}

impl StorageError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Create a permanent error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent(message.into())
    }

    /// Wrap the last transient error after the attempt budget is spent.
    ///
    /// # Panics
    /// Panics if `last` is not transient; only transient failures are retried,
    /// so only they can be exhausted.
    #[must_use]
    pub fn exhausted(attempts: u32, last: StorageError) -> Self {
        // Preconditions
        assert!(attempts >= 1, "exhaustion requires at least one attempt");
        assert!(
            last.is_transient(),
            "only transient errors can exhaust the retry budget"
        );

        Self::Exhausted {
            attempts,
            last: Box::new(last),
        }
    }

    /// Whether retrying this error is expected to help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
