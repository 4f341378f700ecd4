//! Key-value backend trait.
//!
//! This module defines the narrow set of operations the cache store needs
//! from a key-value store. Values are opaque UTF-8 documents; typed
//! (de)serialization happens in [`crate::store`].

use async_trait::async_trait;

/// Error type for backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Failed to reach the store.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected or failed a command.
    #[error("Command error: {0}")]
    Command(String),

    /// In-process state was poisoned by a panicking writer.
    #[error("Backend lock poisoned")]
    LockPoisoned,
}

/// Shape of the value held under a key, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    String,
    List,
    Set,
    Hash,
    SortedSet,
    Stream,
    /// Key does not exist (it may have been deleted during a scan).
    Missing,
    Other(String),
}

impl ValueKind {
    /// Parse the reply of a Redis `TYPE` command.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "list" => Self::List,
            "set" => Self::Set,
            "hash" => Self::Hash,
            "zset" => Self::SortedSet,
            "stream" => Self::Stream,
            "none" => Self::Missing,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::Hash => "hash",
            Self::SortedSet => "zset",
            Self::Stream => "stream",
            Self::Missing => "none",
            Self::Other(name) => name,
        }
    }
}

/// Key-value backend trait for pluggable store implementations.
///
/// Every call is a single independent operation; implementations provide no
/// multi-key atomicity. The only atomicity the cache store relies on is that
/// a single `set` is all-or-nothing.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Get the document stored under `key`, or None if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store a document under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Delete keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, BackendError>;

    /// Atomically increment an integer counter, returning the new value.
    async fn incr(&self, key: &str) -> Result<u64, BackendError>;

    /// Enumerate keys starting with `prefix`. An empty prefix matches every key.
    ///
    /// Order is backend-defined and must not be relied upon.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    /// Report the shape of the value under `key`.
    async fn key_type(&self, key: &str) -> Result<ValueKind, BackendError>;

    /// Read every element of a list value.
    async fn list_range(&self, key: &str) -> Result<Vec<String>, BackendError>;

    /// Remove every key in the selected database.
    async fn flush_all(&self) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_roundtrips_type_names() {
        for name in ["string", "list", "set", "hash", "zset", "stream", "none"] {
            assert_eq!(ValueKind::from_type_name(name).type_name(), name);
        }
    }

    #[test]
    fn test_value_kind_keeps_unknown_names() {
        let kind = ValueKind::from_type_name("ReJSON-RL");
        assert_eq!(kind, ValueKind::Other("ReJSON-RL".to_string()));
        assert_eq!(kind.type_name(), "ReJSON-RL");
    }
}
