//! Configuration types and YAML loading.
//!
//! The `redis` section is required with all of its keys except `password`.
//! `source` and `output` fall back to the documented defaults.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable consulted when `source.api_key` is absent.
pub const API_KEY_ENV: &str = "CMC_PRO_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
pub const DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_TOP_N: usize = 10;

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    pub redis: RedisConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Key-value store connection settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Upstream market-data API settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub limit: u32,
    pub request_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            limit: DEFAULT_LIMIT,
            request_timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("limit", &self.limit)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl SourceConfig {
    /// Resolve the API key from the file, falling back to [`API_KEY_ENV`].
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .or_else(|| lookup(API_KEY_ENV))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: format!("source.api_key (or {})", API_KEY_ENV),
            })
    }
}

/// Chart output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub top_n: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("plots"),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl VaultConfig {
    /// Read, parse and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_yaml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "redis.host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.redis.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "redis.port".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.redis.db < 0 {
            return Err(ConfigError::InvalidValue {
                field: "redis.db".to_string(),
                reason: "must be >= 0".to_string(),
            });
        }
        let base_url = self.source.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "source.base_url".to_string(),
                reason: "must be an http(s) url".to_string(),
            });
        }
        if self.source.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.limit".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.source.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.request_timeout_ms".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.output.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "output.top_n".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
