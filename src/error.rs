//! Error types for sidelock.
//!
//! Uses thiserror for derive macros. Inside the coordinator, filesystem
//! failures are absorbed into degraded status flags rather than propagated;
//! these variants surface at the codec/watch/CLI boundaries.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for sidelock operations.
#[derive(Error, Debug)]
pub enum SidelockError {
    /// A marker artifact exists but its content is unparsable or empty.
    #[error("malformed lock document: {0}")]
    MalformedDocument(String),

    /// The marker artifact could not be created or opened.
    #[error("lock file access denied: {0}")]
    AccessDenied(String),

    /// The marker artifact did not exist at check time but existed by
    /// creation time (another process won the creation race).
    #[error("lost lock creation race: {0}")]
    RaceLost(String),

    /// The filesystem watch backend failed.
    #[error("watch failed: {0}")]
    Watch(String),

    /// A lock is held by another process (CLI claim refused).
    #[error("lock is held by another process: {0}")]
    LockHeld(String),

    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),
}

impl SidelockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SidelockError::MalformedDocument(_)
            | SidelockError::AccessDenied(_)
            | SidelockError::RaceLost(_)
            | SidelockError::LockHeld(_) => exit_codes::LOCK_FAILURE,
            SidelockError::Watch(_) | SidelockError::UserError(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for sidelock operations.
pub type Result<T> = std::result::Result<T, SidelockError>;
