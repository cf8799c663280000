//! Ledger configuration.
//!
//! Loaded from an optional `config/pos_ledger.{toml,json,yaml}` file and then
//! `POS_LEDGER__*` environment variables (`POS_LEDGER__STORE_NO`,
//! `POS_LEDGER__LOGGING__LEVEL`, ...). Every field has a default, so an empty
//! environment yields a usable configuration.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "config/pos_ledger";
const ENV_PREFIX: &str = "POS_LEDGER";

/// Upper bound for `conflict_retries`: a lost race is retried at most once.
pub(crate) const MAX_CONFLICT_RETRIES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    Load(String),
    /// Values were read but violate a constraint.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "failed to load configuration: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    /// Tenant/workspace identifier stamped on every record and id.
    #[serde(default = "default_store_no")]
    pub store_no: String,
    /// Snapshot file for the file-backed store. `None` keeps records in memory.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// First hour of the hourly sales series (inclusive).
    #[serde(default = "default_opening_hour")]
    pub opening_hour: u32,
    /// Last hour of the hourly sales series (inclusive).
    #[serde(default = "default_closing_hour")]
    pub closing_hour: u32,
    /// Local time offset used for "today" and hour-of-day bucketing.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Automatic retries of a read-modify-write after a revision conflict.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Top-N size when a report call omits its limit.
    #[serde(default = "default_top_limit")]
    pub default_top_limit: usize,
    /// Initial connectivity before the first network notification arrives.
    #[serde(default)]
    pub start_online: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for rotating log files. `None` logs to stderr.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_store_no() -> String {
    "local".to_string()
}

fn default_opening_hour() -> u32 {
    7
}

fn default_closing_hour() -> u32 {
    22
}

fn default_conflict_retries() -> u32 {
    1
}

fn default_top_limit() -> usize {
    10
}

fn default_log_level() -> String {
    if cfg!(debug_assertions) {
        "debug".to_string()
    } else {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_no: default_store_no(),
            data_path: None,
            opening_hour: default_opening_hour(),
            closing_hour: default_closing_hour(),
            utc_offset_minutes: 0,
            conflict_retries: default_conflict_retries(),
            default_top_limit: default_top_limit(),
            start_online: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Load from `config/pos_ledger.*` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given file (optional, any format `config` understands)
    /// with environment overrides applied on top.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: LedgerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Convenience for tests and embedders: defaults with a store number.
    pub fn for_store(store_no: impl Into<String>) -> Self {
        Self {
            store_no: store_no.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_no.trim().is_empty() {
            return Err(ConfigError::Invalid("store_no cannot be empty".into()));
        }
        if self.store_no.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "store_no `{}` cannot contain ':'",
                self.store_no
            )));
        }
        if self.opening_hour > 23 || self.closing_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "opening hours must be within 0..=23, got {}..={}",
                self.opening_hour, self.closing_hour
            )));
        }
        if self.opening_hour > self.closing_hour {
            return Err(ConfigError::Invalid(format!(
                "opening_hour {} is after closing_hour {}",
                self.opening_hour, self.closing_hour
            )));
        }
        if self.conflict_retries > MAX_CONFLICT_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "conflict_retries {} exceeds the maximum of {}",
                self.conflict_retries, MAX_CONFLICT_RETRIES
            )));
        }
        if self.checked_offset().is_none() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// The store's local offset. Falls back to UTC for out-of-range values.
    pub fn offset(&self) -> FixedOffset {
        self.checked_offset().unwrap_or_else(|| Utc.fix())
    }

    fn checked_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}
