//! In-process implementation of [`KeyValueBackend`].
//!
//! Used by tests and dry runs. Supports failure injection so the store's
//! rollback paths can be exercised without a live server.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::traits::{BackendError, KeyValueBackend, ValueKind};

/// A value held by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    String(String),
    List(Vec<String>),
    Hash(BTreeMap<String, String>),
}

impl StoredValue {
    fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Hash(_) => ValueKind::Hash,
        }
    }
}

const NO_LIMIT: usize = usize::MAX;

/// Thread-safe in-memory key-value store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    data: Arc<RwLock<BTreeMap<String, StoredValue>>>,
    /// Number of `set` calls still allowed to succeed.
    sets_remaining: Arc<AtomicUsize>,
    fail_prefix: Arc<RwLock<Option<String>>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            sets_remaining: Arc::new(AtomicUsize::new(NO_LIMIT)),
            fail_prefix: Arc::new(RwLock::new(None)),
        }
    }

    /// Let the next `n` writes succeed and fail every one after.
    pub fn fail_sets_after(&self, n: usize) {
        self.sets_remaining.store(n, Ordering::SeqCst);
    }

    /// Fail every write to a key starting with `prefix`.
    pub fn fail_sets_with_prefix(&self, prefix: impl Into<String>) -> Result<(), BackendError> {
        let mut guard = self.fail_prefix.write().map_err(|_| BackendError::LockPoisoned)?;
        *guard = Some(prefix.into());
        Ok(())
    }

    /// Clear any injected failures.
    pub fn heal(&self) -> Result<(), BackendError> {
        self.sets_remaining.store(NO_LIMIT, Ordering::SeqCst);
        let mut guard = self.fail_prefix.write().map_err(|_| BackendError::LockPoisoned)?;
        *guard = None;
        Ok(())
    }

    /// Place a value directly, bypassing failure injection.
    pub fn insert_raw(&self, key: impl Into<String>, value: StoredValue) -> Result<(), BackendError> {
        let mut data = self.data.write().map_err(|_| BackendError::LockPoisoned)?;
        data.insert(key.into(), value);
        Ok(())
    }

    /// Every key currently held, sorted.
    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        Ok(data.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        Ok(data.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.len()? == 0)
    }

    fn check_write(&self, key: &str) -> Result<(), BackendError> {
        let prefix = self.fail_prefix.read().map_err(|_| BackendError::LockPoisoned)?;
        if let Some(prefix) = prefix.as_deref() {
            if key.starts_with(prefix) {
                return Err(BackendError::Command(format!("injected failure writing {}", key)));
            }
        }
        let allowed = self
            .sets_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                NO_LIMIT => Some(NO_LIMIT),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok();
        if allowed {
            Ok(())
        } else {
            Err(BackendError::Command(format!("injected failure writing {}", key)))
        }
    }
}

fn wrong_type(key: &str) -> BackendError {
    BackendError::Command(format!(
        "WRONGTYPE Operation against key {} holding the wrong kind of value",
        key
    ))
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        match data.get(key) {
            None => Ok(None),
            Some(StoredValue::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.check_write(key)?;
        let mut data = self.data.write().map_err(|_| BackendError::LockPoisoned)?;
        data.insert(key.to_string(), StoredValue::String(value.to_string()));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, BackendError> {
        let mut data = self.data.write().map_err(|_| BackendError::LockPoisoned)?;
        let removed = keys.iter().filter(|key| data.remove(*key).is_some()).count();
        Ok(removed as u64)
    }

    async fn incr(&self, key: &str) -> Result<u64, BackendError> {
        let mut data = self.data.write().map_err(|_| BackendError::LockPoisoned)?;
        let current = match data.get(key) {
            None => 0,
            Some(StoredValue::String(value)) => value.parse::<u64>().map_err(|_| {
                BackendError::Command("ERR value is not an integer or out of range".to_string())
            })?,
            Some(_) => return Err(wrong_type(key)),
        };
        let next = current + 1;
        data.insert(key.to_string(), StoredValue::String(next.to_string()));
        Ok(next)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        Ok(data
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn key_type(&self, key: &str) -> Result<ValueKind, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        Ok(data.get(key).map(StoredValue::kind).unwrap_or(ValueKind::Missing))
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, BackendError> {
        let data = self.data.read().map_err(|_| BackendError::LockPoisoned)?;
        match data.get(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::List(items)) => Ok(items.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn flush_all(&self) -> Result<(), BackendError> {
        let mut data = self.data.write().map_err(|_| BackendError::LockPoisoned)?;
        data.clear();
        Ok(())
    }
}
