//! Storage error types.

use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    /// Raised by the in-memory store when failures are switched on.
    #[error("Simulated storage failure for key '{0}'")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }

    pub fn serialization(key: &str, source: serde_json::Error) -> Self {
        StorageError::Serialization {
            key: key.to_string(),
            source,
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::Storage(err.to_string())
    }
}
