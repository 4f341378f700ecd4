//! Generation-swapped entity cache.
//!
//! A refresh never mutates the published data in place. Records are staged
//! under a fresh generation and become visible through a single pointer
//! write, so a failed refresh leaves the previous table readable and leaves
//! no keys of its own behind.

use std::collections::BTreeSet;

use coinvault_core::{CoinId, EntityRecord, Snapshot, StoreError};

use crate::cache::generation_key::{GenerationKey, COUNTER_KEY, NAMESPACE, POINTER_KEY};
use crate::cache::traits::{BackendError, KeyValueBackend, ValueKind};

/// Result of a successful [`CacheStore::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreReceipt {
    /// Generation now published.
    pub generation: u64,
    /// Records written.
    pub written: usize,
    /// Record keys of superseded generations that were removed.
    pub discarded: usize,
}

/// Value reported for one key by [`CacheStore::dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpValue {
    Text(String),
    List(Vec<String>),
    /// Type the dump does not render, e.g. `hash`.
    Unsupported(String),
    /// The key could not be read; the scan continues.
    Unreadable(String),
}

/// One key of the database with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub key: String,
    pub value: DumpValue,
}

impl std::fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            DumpValue::Text(text) => write!(f, "{}: {}", self.key, text),
            DumpValue::List(items) => write!(f, "{}: [{}]", self.key, items.join(", ")),
            DumpValue::Unsupported(kind) => write!(f, "{}: unsupported ({})", self.key, kind),
            DumpValue::Unreadable(reason) => write!(f, "{}: unreadable ({})", self.key, reason),
        }
    }
}

/// Persists entity records in a [`KeyValueBackend`] and reads them back.
#[derive(Debug, Clone)]
pub struct CacheStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> CacheStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the cached table with `records`.
    ///
    /// Readers observe either the previous table or the new one, never a
    /// mix. On error the previous table stays published.
    pub async fn store(&self, records: &[EntityRecord]) -> Result<StoreReceipt, StoreError> {
        let documents = encode_batch(records)?;

        let generation = self
            .backend
            .incr(COUNTER_KEY)
            .await
            .map_err(|e| write_failed(COUNTER_KEY, e))?;

        let mut staged: Vec<String> = Vec::with_capacity(documents.len());
        for (id, document) in &documents {
            let key = GenerationKey::new(generation, *id).encode();
            if let Err(e) = self.backend.set(&key, document).await {
                tracing::warn!(generation, key = %key, error = %e, "staging write failed");
                self.rollback(generation, &staged).await;
                return Err(write_failed(&key, e));
            }
            staged.push(key);
        }

        if let Err(e) = self
            .backend
            .set(POINTER_KEY, &generation.to_string())
            .await
        {
            tracing::warn!(generation, error = %e, "publishing generation failed");
            self.rollback(generation, &staged).await;
            return Err(StoreError::PublishFailed {
                generation,
                reason: e.to_string(),
            });
        }

        let discarded = self.discard_superseded(generation).await;

        tracing::info!(
            generation,
            written = staged.len(),
            discarded,
            "published cache generation"
        );
        Ok(StoreReceipt {
            generation,
            written: staged.len(),
            discarded,
        })
    }

    /// Read the published table.
    ///
    /// An empty cache yields an empty snapshot. Any unreadable value fails
    /// the whole load.
    pub async fn load_all(&self) -> Result<Snapshot, StoreError> {
        let Some(generation) = self.current_generation().await? else {
            return Ok(Snapshot::default());
        };

        let prefix = GenerationKey::generation_prefix(generation);
        let keys = self
            .backend
            .scan_prefix(&prefix)
            .await
            .map_err(|e| read_failed(&prefix, e))?;

        let mut rows = Vec::with_capacity(keys.len());
        for key in keys {
            let document = self
                .backend
                .get(&key)
                .await
                .map_err(|e| read_failed(&key, e))?
                .ok_or_else(|| StoreError::Missing { key: key.clone() })?;
            let record: EntityRecord =
                serde_json::from_str(&document).map_err(|e| StoreError::Corrupt {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            rows.push(record);
        }

        tracing::debug!(generation, rows = rows.len(), "loaded cache snapshot");
        Ok(Snapshot::new(Some(generation), rows))
    }

    /// Every key in the database with its value, sorted by key.
    ///
    /// Per-key failures are reported inline instead of aborting.
    pub async fn dump(&self) -> Result<Vec<DumpEntry>, StoreError> {
        let mut keys = self
            .backend
            .scan_prefix("")
            .await
            .map_err(|e| read_failed("*", e))?;
        keys.sort();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = match self.dump_value(&key).await {
                Ok(value) => value,
                Err(e) => DumpValue::Unreadable(e.to_string()),
            };
            entries.push(DumpEntry { key, value });
        }
        Ok(entries)
    }

    /// Remove every key in the database, including keys this store does not own.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.backend
            .flush_all()
            .await
            .map_err(|e| write_failed("*", e))
    }

    /// Generation currently published, if any.
    pub async fn current_generation(&self) -> Result<Option<u64>, StoreError> {
        let raw = self
            .backend
            .get(POINTER_KEY)
            .await
            .map_err(|e| read_failed(POINTER_KEY, e))?;
        raw.map(|value| {
            value.trim().parse::<u64>().map_err(|e| StoreError::Corrupt {
                key: POINTER_KEY.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }

    async fn dump_value(&self, key: &str) -> Result<DumpValue, BackendError> {
        let value = match self.backend.key_type(key).await? {
            ValueKind::String => DumpValue::Text(self.backend.get(key).await?.unwrap_or_default()),
            ValueKind::List => DumpValue::List(self.backend.list_range(key).await?),
            other => DumpValue::Unsupported(other.type_name().to_string()),
        };
        Ok(value)
    }

    async fn rollback(&self, generation: u64, staged: &[String]) {
        if staged.is_empty() {
            return;
        }
        if let Err(e) = self.backend.delete(staged).await {
            tracing::warn!(generation, error = %e, "rollback of staged keys failed");
        }
    }

    /// Delete record keys of every generation older than `published`.
    ///
    /// Covers the previously published generation as well as generations
    /// orphaned by an interrupted run or a failed rollback. Newer generations
    /// may belong to a writer still staging and are left alone.
    async fn discard_superseded(&self, published: u64) -> usize {
        let prefix = format!("{}:", NAMESPACE);
        let keys = match self.backend.scan_prefix(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(published, error = %e, "listing superseded generations failed");
                return 0;
            }
        };
        let stale: Vec<String> = keys
            .into_iter()
            .filter(|key| {
                GenerationKey::decode(key).is_some_and(|k| k.generation() < published)
            })
            .collect();
        if stale.is_empty() {
            return 0;
        }
        match self.backend.delete(&stale).await {
            Ok(removed) => removed as usize,
            Err(e) => {
                tracing::warn!(published, error = %e, "discarding superseded generations failed");
                0
            }
        }
    }
}

/// Validate and serialize a whole batch before anything is written.
fn encode_batch(records: &[EntityRecord]) -> Result<Vec<(CoinId, String)>, StoreError> {
    if records.is_empty() {
        return Err(StoreError::EmptyBatch);
    }
    let mut seen = BTreeSet::new();
    let mut documents = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(StoreError::DuplicateId { id: record.id });
        }
        let document = serde_json::to_string(record).map_err(|e| StoreError::Serialization {
            id: record.id,
            reason: e.to_string(),
        })?;
        documents.push((record.id, document));
    }
    Ok(documents)
}

fn write_failed(key: &str, e: BackendError) -> StoreError {
    match e {
        BackendError::Connection(reason) => StoreError::Connection { reason },
        other => StoreError::WriteFailed {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}

fn read_failed(key: &str, e: BackendError) -> StoreError {
    match e {
        BackendError::Connection(reason) => StoreError::Connection { reason },
        other => StoreError::ReadFailed {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}
