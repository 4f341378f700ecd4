//! CoinMarketCap API response types

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// LISTING TYPES
// ============================================================================

/// Body of `GET /v1/cryptocurrency/map`.
///
/// Entries stay untyped here; screening decides which of them become records.
#[derive(Debug, Clone, Deserialize)]
pub struct MapResponse {
    pub data: Vec<Value>,
    #[serde(default)]
    pub status: Option<ApiStatus>,
}

// ============================================================================
// SHARED TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub credit_count: Option<i64>,
}

/// Error bodies carry only the status block.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub status: ApiStatus,
}
