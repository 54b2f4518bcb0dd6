//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent contract violations of the tree core.
/// They are raised before any recursive work happens and are never logged here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid argument: {name} must be >= 0, got {value}")]
    InvalidArgument { name: &'static str, value: i64 },

    #[error("malformed children at depth {depth}: {reason}")]
    MalformedChildren { depth: usize, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
