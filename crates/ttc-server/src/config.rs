//! Service configuration
//!
//! Layered from lowest to highest precedence:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment (`ASTRA_DB_*`, `TTC_BIND`, `TTC_DATA_DIR`)
//! 4. Command-line flags

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use ttc_store::StoreConfig;

use crate::error::ConfigError;

/// Environment variable overriding the listen address
pub const ENV_BIND: &str = "TTC_BIND";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid(format!("unknown log format '{other}'"))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".to_string(),
        }
    }
}

/// Listing limits for `GET /api/donations`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLimits {
    /// Limit used when the query omits one
    pub default: usize,
    /// Hard cap on any requested limit
    pub max: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self { default: 50, max: 500 }
    }
}

impl ListLimits {
    /// Resolve a requested limit against the defaults and cap
    #[inline]
    #[must_use]
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default).min(self.max)
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Logging
    pub log: LogConfig,
    /// Listing limits
    pub limits: ListLimits,
    /// Storage backends
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log: LogConfig::default(),
            limits: ListLimits::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// TOML file to load
    pub config_file: Option<PathBuf>,
    /// Listen address
    pub bind: Option<SocketAddr>,
    /// Local data directory
    pub data_dir: Option<PathBuf>,
    /// Keep the local tier in memory
    pub memory_only: bool,
    /// Log format
    pub log_format: Option<LogFormat>,
    /// Log filter
    pub log_filter: Option<String>,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With storage configuration
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` if the text is not valid for this schema
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if its contents are invalid
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Build configuration from every layer
    ///
    /// # Errors
    /// File, environment or flag values that cannot be used.
    pub fn load(cli: &CliOverrides) -> Result<Self, ConfigError> {
        Self::load_with(cli, |key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::load`] with an explicit environment lookup
    ///
    /// # Errors
    /// File, environment or flag values that cannot be used.
    pub fn load_with(
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(bind) = env(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            config.bind = bind
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{ENV_BIND}='{bind}' is not an address")))?;
        }
        config.store = config.store.apply_env_from(&env);

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(dir) = &cli.data_dir {
            config.store.data_dir = dir.clone();
        }
        if cli.memory_only {
            config.store.memory_only = true;
        }
        if let Some(format) = cli.log_format {
            config.log.format = format;
        }
        if let Some(filter) = &cli.log_filter {
            config.log.filter = filter.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check configuration consistency
    ///
    /// # Errors
    /// - `ConfigError::Invalid` on inconsistent limits or storage settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.default == 0 || self.limits.default > self.limits.max {
            return Err(ConfigError::Invalid(format!(
                "limits.default must be within 1..={}",
                self.limits.max
            )));
        }
        self.store
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Copy with secrets masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(hosted) = copy.store.hosted.as_mut() {
            if !hosted.token.is_empty() {
                hosted.token = "***".to_string();
            }
        }
        copy
    }
}
