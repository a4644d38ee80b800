//! Error types for Keyfig Core

use thiserror::Error;

/// A single failed key operation inside a bulk call.
#[derive(Debug, Clone)]
pub struct KeyFailure {
    /// The key whose operation failed
    pub key: String,
    /// The backing store's error message
    pub message: String,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: connecting, selecting the namespace, or
    /// enumerating keys. Not retried by the core.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An individual get/set round trip failed.
    #[error("Key operation failed for '{key}': {message}")]
    KeyOperation { key: String, message: String },

    /// Aggregate of per-key failures from a fan-out operation. Already-applied
    /// writes stay applied; there is no rollback.
    #[error("{} key operation(s) failed: {}", failures.len(), failures.iter().map(|f| f.key.as_str()).collect::<Vec<_>>().join(", "))]
    Bulk { failures: Vec<KeyFailure> },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_error_lists_keys() {
        let err = Error::Bulk {
            failures: vec![
                KeyFailure {
                    key: "foo".to_string(),
                    message: "boom".to_string(),
                },
                KeyFailure {
                    key: "bar".to_string(),
                    message: "boom".to_string(),
                },
            ],
        };

        let rendered = err.to_string();
        assert!(rendered.contains("2 key operation(s) failed"));
        assert!(rendered.contains("foo"));
        assert!(rendered.contains("bar"));
    }
}
