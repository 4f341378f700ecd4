//! CoinMarketCap provider implementation
//!
//! This module fetches the `cryptocurrency/map` listing and screens it into
//! typed entity records.

pub mod client;
pub mod types;

pub use client::{parse_listing, CoinMarketCapClient};
