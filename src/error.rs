//! Error types for the expiring store.
//!
//! Persistence failures, malformed envelopes and invalid input are kept as
//! distinct variants so callers can tell a broken adapter apart from a
//! cache miss. Expiry is never an error: an expired entry is reported as
//! absent.

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying secure primitive failed.
    #[error("{op} failed for key '{key}': {source}")]
    Persistence {
        key: String,
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Bytes were present but are not a valid envelope.
    #[error("malformed envelope: {reason}")]
    Decode { reason: String },

    /// The value could not be serialized.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// Key rejected before reaching the adapter.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// A lifetime of zero would produce an entry that is expired on write.
    #[error("lifetime must be greater than zero")]
    InvalidLifetime,

    /// Some removals of a best-effort clear failed.
    #[error("failed to clear {} key(s): {}", .failed.len(), .failed.join(", "))]
    PartialClear { failed: Vec<String> },
}

impl Error {
    /// Create a persistence error for an adapter call.
    pub fn persistence(key: impl Into<String>, op: &'static str, source: anyhow::Error) -> Self {
        Self::Persistence {
            key: key.into(),
            op,
            source,
        }
    }

    /// Create a decode error.
    pub fn decode(reason: impl ToString) -> Self {
        Self::Decode {
            reason: reason.to_string(),
        }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    /// Returns true if the adapter failed (the caller may retry).
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_display_names_key_and_op() {
        let err = Error::persistence("auth_token", "put", anyhow::anyhow!("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("put"));
        assert!(msg.contains("auth_token"));
        assert!(msg.contains("disk full"));
        assert!(err.is_persistence());
    }

    #[test]
    fn test_partial_clear_lists_keys() {
        let err = Error::PartialClear {
            failed: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "failed to clear 2 key(s): a, b");
        assert!(!err.is_persistence());
    }
}
