//! Error types for model validation
//!
//! Raised when fetched data violates an invariant of the model: identity
//! fields changing between fetches of the same pair, or two balance entries
//! competing for the same key.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// An immutable identity field differs between two snapshots of one pair
    #[error("Identity mismatch for pair {pair_id}: {field} changed from {expected} to {actual}")]
    IdentityMismatch {
        pair_id: String,
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Two balance entries resolve to the same key
    #[error("Duplicate balance key: {key}")]
    DuplicateBalanceKey { key: String },

    /// Creation timestamp cannot be represented as a date
    #[error("Invalid unix timestamp: {timestamp}")]
    InvalidTimestamp { timestamp: i64 },
}
