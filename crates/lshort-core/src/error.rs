use std::fmt::Display;
use thiserror::Error;

/// Result type for link store operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// The link store operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Shrink,
    Expand,
    Close,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Open => f.write_str("open"),
            Operation::Shrink => f.write_str("shrink"),
            Operation::Expand => f.write_str("expand"),
            Operation::Close => f.write_str("close"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("short key is empty")]
    Empty,
    #[error("symbol {symbol:?} at position {position} is not in the key alphabet")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("short key {0:?} starts with the zero symbol")]
    NonCanonical(String),
    #[error("short key {0:?} is out of the sequence range")]
    Overflow(String),
}

/// Failure classes of the embedded storage engines.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("unable to allocate a sequence number during {operation}: {source}")]
    Allocation {
        operation: Operation,
        source: lshort_sequence::Error,
    },
    #[error("unable to encode short key: {0}")]
    Encoding(#[from] CodecError),
    #[error("unable to {operation} {subject:?}: {source}")]
    Storage {
        operation: Operation,
        subject: String,
        source: StorageError,
    },
    #[error("short key not found: {0}")]
    NotFound(String),
}

impl LinkError {
    pub fn allocation(operation: Operation, source: lshort_sequence::Error) -> Self {
        Self::Allocation { operation, source }
    }

    /// Wraps a storage failure with the operation and the key or url involved.
    pub fn storage(operation: Operation, subject: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            operation,
            subject: subject.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LinkError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_carries_context() {
        let err = LinkError::storage(
            Operation::Shrink,
            "https://example.com/a",
            StorageError::Unavailable("disk gone".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "unable to shrink \"https://example.com/a\": storage backend unavailable: disk gone"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn allocation_error_names_operation() {
        let err = LinkError::allocation(
            Operation::Shrink,
            lshort_sequence::Error::Exhausted { current: u64::MAX },
        );
        assert!(err.to_string().starts_with("unable to allocate a sequence number during shrink"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_distinct_from_faults() {
        assert!(LinkError::NotFound("abc".to_string()).is_not_found());
    }
}
