//! Market-data provider implementations
//!
//! This module contains concrete implementations of the MarketDataSource
//! trait.

pub mod coinmarketcap;

pub use coinmarketcap::CoinMarketCapClient;
