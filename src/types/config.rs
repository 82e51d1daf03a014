//! Configuration for cache-helper.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::CacheHelperResult;

/// Default file name looked up by [`Config::load_or_default`].
pub const DEFAULT_CONFIG_FILE: &str = "cache_helper.toml";

/// Main configuration for cache-helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Which backend stores memoized values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process LRU store.
    #[default]
    Memory,
    /// Stores nothing; every call runs the wrapped function.
    Null,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled. When false the null backend is used regardless of `backend`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Backend kind.
    #[serde(default)]
    pub backend: BackendKind,

    /// Maximum number of entries held by the memory backend.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// TTL used by wrappers declared with `Timeout::Default`, in seconds.
    /// Zero means entries never expire.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Prefix prepended to every hashed key sent to the backend.
    #[serde(default)]
    pub key_prefix: String,

    /// How deeply collection arguments may nest before key creation fails.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Log backend read/write failures and fall through to the wrapped
    /// function instead of returning them.
    #[serde(default = "default_true")]
    pub fail_open: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: BackendKind::default(),
            capacity: default_capacity(),
            default_timeout_secs: default_timeout_secs(),
            key_prefix: String::new(),
            max_depth: default_max_depth(),
            fail_open: true,
        }
    }
}

impl CacheConfig {
    /// Default TTL as a duration.
    pub fn default_timeout(&self) -> Option<Duration> {
        match self.default_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Backend that will actually be built for this configuration.
    pub fn effective_backend(&self) -> BackendKind {
        if self.enabled {
            self.backend
        } else {
            BackendKind::Null
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    300 // 5 minutes
}

fn default_max_depth() -> usize {
    2
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> CacheHelperResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CacheHelperResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Tries to load configuration from the current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_else(|_| Self::default_config())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
