use std::fmt;

use crate::book::BookId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store client is not initialized yet (or went away).
    Unavailable(String),
    LockPoisoned(&'static str),
    NotFound(BookId),
    Serde(String),
    Io(String),
}

impl StoreError {
    /// Whether a connection attempt that failed with this error may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "record store unavailable: {}", reason),
            StoreError::LockPoisoned(operation) => {
                write!(f, "record store lock poisoned during {}", operation)
            }
            StoreError::NotFound(id) => write!(f, "book not found: {}", id),
            StoreError::Serde(msg) => write!(f, "record serialization error: {}", msg),
            StoreError::Io(msg) => write!(f, "record store io error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
