//! Error types for addrcache.
//!
//! Store operations never fail on their own; errors come from configuration,
//! interrupted waits, and the expiry timer pool.

use thiserror::Error;

/// Result type alias using `AddressCacheError`.
pub type Result<T> = std::result::Result<T, AddressCacheError>;

/// Main error type for all addrcache operations.
#[derive(Debug, Error)]
pub enum AddressCacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Max age, time unit, or worker count cannot be used to build a cache.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration source could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // RETRIEVAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A blocked `take` was interrupted before an address arrived.
    ///
    /// No entry was consumed; calling `take` again is valid.
    #[error("Interrupted while waiting for an address")]
    InterruptedWait,

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPIRY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The expiry timer could not be armed.
    ///
    /// When raised by `add`, the address is already cached and has no
    /// guaranteed expiry.
    #[error("Expiry scheduling failed: {0}")]
    SchedulingFailure(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // LIFECYCLE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The cache has been cleared and no longer accepts addresses.
    #[error("Address cache is closed")]
    Closed,
}

impl AddressCacheError {
    /// Returns true if the failed operation can simply be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AddressCacheError::InterruptedWait)
    }

    /// Returns true if this error comes from bad configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AddressCacheError::InvalidConfiguration(_)
                | AddressCacheError::ConfigError(_)
                | AddressCacheError::JsonError(_)
        )
    }
}
