//! Error types for the refresh pipeline and the binary.

use coinvault_core::{ConfigError, SourceError, StoreError};
use coinvault_storage::BackendError;

/// Failure of one pipeline step.
///
/// Reported inside [`RefreshOutcome`](crate::RefreshOutcome) rather than
/// propagated, so the caller decides whether a run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(SourceError),

    #[error("Cache write failed: {0}")]
    StoreWrite(StoreError),

    #[error("Cache read failed: {0}")]
    StoreRead(StoreError),
}

/// Startup-fatal errors of the `coinvault` binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Key-value store unavailable: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
