//! Error types for Stackwise.

use std::fmt;

/// Result type alias using the Stackwise [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the Stackwise crates.
///
/// All failure handling is local validation at entry: once a placement round
/// has been admitted into the state machine, no operation is expected to
/// fault under a valid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration rejected before entering the state machine.
    InvalidConfig(String),
    /// Internal invariant violation.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
