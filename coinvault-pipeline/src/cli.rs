//! Command-line arguments.

use std::path::PathBuf;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "COINVAULT_CONFIG";

/// Used when neither `--config` nor [`CONFIG_ENV`] is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    /// Flush the database and exit.
    pub flush: bool,
}

impl CliArgs {
    /// Parse the process arguments.
    pub fn from_env() -> Result<Self, String> {
        Self::parse(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Parse `args` (without the program name). `--config` wins over the
    /// environment, which wins over [`DEFAULT_CONFIG_PATH`].
    pub fn parse<I, F>(args: I, lookup: F) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
        F: FnOnce(&str) -> Option<String>,
    {
        let mut config_path = None;
        let mut flush = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| "--config requires a path".to_string())?;
                    config_path = Some(PathBuf::from(path));
                }
                "--flush" => flush = true,
                other => return Err(format!("unrecognized argument: {}", other)),
            }
        }

        let config_path = config_path
            .or_else(|| lookup(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Ok(Self { config_path, flush })
    }
}
