//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors describe input that cannot be turned into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid tree source '{input}': {reason}")]
    InvalidTreeSource { input: String, reason: String },

    #[error("invalid tree '{input}': {reason}")]
    InvalidTree { input: String, reason: String },

    #[error("generated values overflow: k={k}, size={size}")]
    ValueOverflow { k: i64, size: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
