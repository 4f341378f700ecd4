//! coinvault Core - Entity Types
//!
//! Pure data structures shared by every other crate: the entity record
//! schema, the error taxonomy and configuration types.

pub mod config;
pub mod error;
pub mod record;
pub mod snapshot;

pub use config::{OutputConfig, RedisConfig, SourceConfig, VaultConfig, API_KEY_ENV};
pub use error::{
    ConfigError, ReportError, SourceError, StoreError, ValidationError, VaultError, VaultResult,
};
pub use record::{
    missing_fields, CoinId, EntityRecord, FetchOutcome, Platform, RejectedEntry, Timestamp,
    REQUIRED_FIELDS,
};
pub use snapshot::Snapshot;
