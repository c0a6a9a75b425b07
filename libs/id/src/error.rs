//! Error types for ID parsing.

use thiserror::Error;

/// Errors that can occur when parsing generated IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The ID is not 26 characters long.
    #[error("invalid ID length: expected 26, got {0}")]
    InvalidLength(usize),

    /// The string is not valid Crockford base32 or overflows 128 bits.
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }
}
