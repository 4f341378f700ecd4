//! coinvault Source - upstream market-data access
//!
//! Defines the [`MarketDataSource`] trait the refresh pipeline depends on and
//! the CoinMarketCap implementation of it.

use async_trait::async_trait;
use coinvault_core::{FetchOutcome, SourceError};

pub mod providers;

pub use providers::coinmarketcap::{parse_listing, CoinMarketCapClient};

// ============================================================================
// MARKET DATA SOURCE TRAIT
// ============================================================================

/// A provider of entity listings.
///
/// Implementations issue one request per call and never retry; the caller
/// owns retry policy.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch up to `limit` entities and screen them against the record schema.
    ///
    /// # Returns
    /// * `Ok(FetchOutcome)` - Accepted records in upstream order plus rejected entries
    /// * `Err(SourceError)` - Transport failure, non-success status or malformed payload
    async fn fetch_entities(&self, limit: u32) -> Result<FetchOutcome, SourceError>;

    /// Short provider name used in logs.
    fn provider(&self) -> &str;
}
