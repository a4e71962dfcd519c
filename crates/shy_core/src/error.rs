//! Synchronization error types

use thiserror::Error;

/// Errors raised synchronously by progress and configuration setters.
///
/// Readiness timeouts, superseded waits, and programmatic-scroll echoes are
/// not errors: they are logged and dropped by the coordinator.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Progress assignment outside `[0, 1]` (NaN included)
    #[error("progress must be within [0, 1], got {0}")]
    ProgressOutOfRange(f64),

    /// Threshold assignment below zero (NaN included)
    #[error("threshold must not be negative, got {0}")]
    NegativeThreshold(f64),

    /// Configuration values that cannot drive the engine
    #[error("invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text that failed to parse
    #[error("failed to parse sync configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
