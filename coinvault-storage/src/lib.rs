//! coinvault Storage - Entity Cache
//!
//! Persists screened entity records in a key-value store and reads them back
//! as a [`Snapshot`](coinvault_core::Snapshot). Writes go to a staged
//! generation that is published with a single pointer swap.

pub mod cache;
pub mod store;

pub use cache::{
    BackendError, GenerationKey, InMemoryBackend, KeyValueBackend, RedisBackend, StoredValue,
    ValueKind, COUNTER_KEY, POINTER_KEY,
};
pub use store::{CacheStore, DumpEntry, DumpValue, StoreReceipt};
