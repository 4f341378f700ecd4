//! CoinMarketCap HTTP client

use super::types::{ApiError, MapResponse};
use crate::MarketDataSource;
use async_trait::async_trait;
use coinvault_core::{FetchOutcome, SourceConfig, SourceError};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const PROVIDER: &str = "coinmarketcap";
const MAP_ENDPOINT: &str = "v1/cryptocurrency/map";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// CoinMarketCap API client.
///
/// The API key is attached to every request; it is never read from ambient
/// state.
pub struct CoinMarketCapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CoinMarketCapClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://pro-api.coinmarketcap.com`
    /// * `api_key` - CoinMarketCap pro API key
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::RequestFailed {
                endpoint: MAP_ENDPOINT.to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from the `source` configuration section.
    pub fn from_config(config: &SourceConfig, api_key: String) -> Result<Self, SourceError> {
        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    fn map_url(&self) -> String {
        format!("{}/{}", self.base_url, MAP_ENDPOINT)
    }
}

#[async_trait]
impl MarketDataSource for CoinMarketCapClient {
    async fn fetch_entities(&self, limit: u32) -> Result<FetchOutcome, SourceError> {
        let url = self.map_url();
        tracing::debug!(%url, limit, "Fetching entity listing");

        let response = self
            .client
            .get(&url)
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| SourceError::RequestFailed {
            endpoint: url.clone(),
            reason: format!("Failed to read body: {}", e),
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(classify_status(status, &text));
        }

        let outcome = parse_listing(&body)?;
        for rejected in &outcome.rejected {
            tracing::warn!(
                index = rejected.index,
                id = ?rejected.id,
                reason = %rejected.reason,
                "Dropping upstream entry that failed screening"
            );
        }
        tracing::info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Listing screened"
        );
        Ok(outcome)
    }

    fn provider(&self) -> &str {
        PROVIDER
    }
}

/// Parse a `cryptocurrency/map` body and screen its entries.
pub fn parse_listing(body: &[u8]) -> Result<FetchOutcome, SourceError> {
    let parsed: MapResponse =
        serde_json::from_slice(body).map_err(|e| SourceError::MalformedPayload {
            reason: e.to_string(),
        })?;
    Ok(FetchOutcome::screen(&parsed.data))
}

/// Map a non-success response onto the source error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> SourceError {
    let message = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error
            .status
            .error_message
            .unwrap_or_else(|| format!("error code {}", api_error.status.error_code)),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => body.to_string(),
    };

    match status {
        StatusCode::BAD_REQUEST => SourceError::InvalidArgument { message },
        _ => SourceError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

impl std::fmt::Debug for CoinMarketCapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinMarketCapClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
