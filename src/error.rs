//! Error types for the index.

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Tree order is below the minimum fan-out
    #[error("Invalid configuration: order {order} is below the minimum of {min}")]
    InvalidConfiguration { order: usize, min: usize },

    /// Key is already present (rejected by `insert`)
    #[error("Duplicate key")]
    DuplicateKey,

    /// A structural invariant does not hold
    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl IndexError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::InvalidConfiguration { order: 2, min: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: order 2 is below the minimum of 3"
        );
        assert_eq!(IndexError::DuplicateKey.to_string(), "Duplicate key");
        assert_eq!(
            IndexError::corruption("bad chain").to_string(),
            "Corruption detected: bad chain"
        );
    }
}
