//! CLI configuration.
//!
//! Resolved in layers, later layers winning: built-in defaults, an optional
//! YAML file passed with `--config`, then environment variables. The
//! `--state` and `--log-json` flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default location of the ledger state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".kyc/ledger.json";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// JSON file holding the persisted ledger.
    pub state_file: PathBuf,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            log_json: false,
        }
    }
}

/// On-disk shape of the `--config` file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    state_file: Option<PathBuf>,
    log_json: Option<bool>,
}

impl CliConfig {
    /// Defaults pointing at an explicit state file.
    pub fn for_state_file(path: impl Into<PathBuf>) -> Self {
        Self {
            state_file: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from defaults, an optional YAML file, and the
    /// process environment.
    ///
    /// Variables:
    /// - `KYC_STATE_FILE` (default: `.kyc/ledger.json`)
    /// - `KYC_LOG_JSON` (`true`/`false`/`1`/`0`, default: `false`)
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(config_file, |var| std::env::var(var).ok())
    }

    /// Like [`CliConfig::load`], reading variables through `lookup`.
    pub fn load_with(
        config_file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = config_file {
            config.apply_file(path)?;
        }
        if let Some(state_file) = lookup("KYC_STATE_FILE") {
            config.state_file = PathBuf::from(state_file);
        }
        if let Some(raw) = lookup("KYC_LOG_JSON") {
            config.log_json = parse_bool("KYC_LOG_JSON", &raw)?;
        }
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = if content.trim().is_empty() {
            FileConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        if let Some(state_file) = file.state_file {
            self.state_file = state_file;
        }
        if let Some(log_json) = file.log_json {
            self.log_json = log_json;
        }
        Ok(())
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidBool { var: String, value: String },
}
