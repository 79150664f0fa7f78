//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent inputs that violate the column-tree contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown provided group: {0}")]
    UnknownGroup(String),

    #[error("displayed group handle no longer valid: {0}")]
    StaleHandle(String),

    #[error("grouping did not converge after {limit} passes (cyclic group parents?)")]
    PassLimitExceeded { limit: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
