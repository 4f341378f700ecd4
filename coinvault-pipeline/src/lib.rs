//! coinvault Pipeline - Refresh Cycle
//!
//! Wires a [`MarketDataSource`](coinvault_source::MarketDataSource) to a
//! [`CacheStore`](coinvault_storage::CacheStore) and hosts the pieces of the
//! `coinvault` binary: argument parsing and logging setup.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod telemetry;

pub use cli::CliArgs;
pub use error::{AppError, PipelineError};
pub use pipeline::{RefreshOutcome, RefreshPipeline};
pub use telemetry::{init_tracing, TelemetryConfig};
