//! Tracing subscriber setup for the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set to `1` or `true` for JSON log lines.
pub const LOG_JSON_ENV: &str = "COINVAULT_LOG_JSON";

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "coinvault=info,info";

/// Logging options read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: std::env::var(LOG_JSON_ENV)
                .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| format!("Failed to init subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvVarGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let original = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_deref() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    // One test touches the variable so parallel tests cannot race on it.
    #[test]
    fn test_json_flag_from_env() {
        {
            let _guard = EnvVarGuard::set(LOG_JSON_ENV, None);
            assert!(!TelemetryConfig::default().json);
        }
        {
            let _guard = EnvVarGuard::set(LOG_JSON_ENV, Some("1"));
            assert!(TelemetryConfig::default().json);
        }
        {
            let _guard = EnvVarGuard::set(LOG_JSON_ENV, Some("TRUE"));
            assert!(TelemetryConfig::default().json);
        }
        {
            let _guard = EnvVarGuard::set(LOG_JSON_ENV, Some("no"));
            assert!(!TelemetryConfig::default().json);
        }
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = TelemetryConfig { json: false };
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
