//! Error types for coinvault operations

use thiserror::Error;

use crate::CoinId;

/// Upstream market-data errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Invalid argument rejected by provider: {message}")]
    InvalidArgument { message: String },

    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Key-value cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection to key-value store failed: {reason}")]
    Connection { reason: String },

    #[error("Refusing to store an empty batch")]
    EmptyBatch,

    #[error("Duplicate id {id} in batch")]
    DuplicateId { id: CoinId },

    #[error("Serialization failed for id {id}: {reason}")]
    Serialization { id: CoinId, reason: String },

    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Publishing generation {generation} failed: {reason}")]
    PublishFailed { generation: u64, reason: String },

    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Key {key} vanished during read")]
    Missing { key: String },

    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Schema screening errors for a single upstream entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entry is not a JSON object")]
    NotAnObject,

    #[error("Required fields missing: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Malformed entry: {reason}")]
    Malformed { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config YAML: {reason}")]
    Parse { reason: String },

    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Report and chart rendering errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Cannot prepare output directory {path}: {reason}")]
    OutputDir { path: String, reason: String },

    #[error("Rendering {chart} failed: {reason}")]
    Render { chart: String, reason: String },
}

/// Master error type for all coinvault errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Result type alias for coinvault operations.
pub type VaultResult<T> = Result<T, VaultError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display_status() {
        let err = SourceError::Status {
            status: 401,
            message: "API key missing".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("401"));
        assert!(msg.contains("API key missing"));
    }

    #[test]
    fn test_validation_error_lists_missing_fields() {
        let err = ValidationError::MissingFields {
            fields: vec!["platform".to_string(), "slug".to_string()],
        };
        assert_eq!(
            format!("{}", err),
            "Required fields missing: platform, slug"
        );
    }

    #[test]
    fn test_store_error_display_write_failed() {
        let err = StoreError::WriteFailed {
            key: "coin:3:1".to_string(),
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("coin:3:1"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "redis.port".to_string(),
            reason: "must be > 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("redis.port"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn test_vault_error_from_variants() {
        let source = VaultError::from(SourceError::MalformedPayload {
            reason: "no data".to_string(),
        });
        assert!(matches!(source, VaultError::Source(_)));

        let store = VaultError::from(StoreError::EmptyBatch);
        assert!(matches!(store, VaultError::Store(_)));

        let validation = VaultError::from(ValidationError::NotAnObject);
        assert!(matches!(validation, VaultError::Validation(_)));

        let config = VaultError::from(ConfigError::MissingRequired {
            field: "redis".to_string(),
        });
        assert!(matches!(config, VaultError::Config(_)));

        let report = VaultError::from(ReportError::Render {
            chart: "rank_distribution".to_string(),
            reason: "empty".to_string(),
        });
        assert!(matches!(report, VaultError::Report(_)));
    }
}
