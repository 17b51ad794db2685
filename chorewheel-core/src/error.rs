//! Error types for the planner seams.

use thiserror::Error;

/// A serialized preference record could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    #[error("malformed preference record: {0}")]
    Malformed(String),
}

/// The notification dispatcher rejected a batch.
///
/// Nothing here is retried; partial delivery is not reconciled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher rejected batch: {0}")]
    Rejected(String),
}

/// Reminder clock settings that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid clock format '{0}'")]
    InvalidFormat(String),
}
