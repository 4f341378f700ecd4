//! Key-value layer underneath the cache store.
//!
//! # Key layout
//!
//! | key                 | value                               |
//! |---------------------|-------------------------------------|
//! | `coin:<gen>:<id>`   | JSON document of one entity record  |
//! | `coin:current`      | published generation number         |
//! | `coin:generation`   | last allocated generation number    |
//!
//! Record keys can only be built through [`GenerationKey`], which makes it
//! impossible to address a record without naming its generation.

pub mod generation_key;
pub mod memory_backend;
pub mod redis_backend;
pub mod traits;

pub use generation_key::{GenerationKey, COUNTER_KEY, NAMESPACE, POINTER_KEY};
pub use memory_backend::{InMemoryBackend, StoredValue};
pub use redis_backend::RedisBackend;
pub use traits::{BackendError, KeyValueBackend, ValueKind};
