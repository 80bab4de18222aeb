//! Configuration loading.
//!
//! Settings come from a TOML file and the environment, in that order;
//! environment values win. File resolution:
//! 1. explicit path (`--config <path>`), which must exist
//! 2. `~/.adsnap/config.toml`, if present
//! 3. built-in defaults
//!
//! The API key is never read from the file. It comes from `BRIA_API_KEY`
//! only, so config files can be shared without leaking credentials.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::providers::bria::DEFAULT_BASE_URL;
use crate::validation::{Constraints, DEFAULT_MAX_FILE_SIZE};
use crate::{AdsnapError, Result};

pub const ENV_API_KEY: &str = "BRIA_API_KEY";
pub const ENV_BASE_URL: &str = "BRIA_BASE_URL";
pub const ENV_MAX_FILE_SIZE: &str = "ADSNAP_MAX_FILE_SIZE";
pub const ENV_CACHE_TTL: &str = "ADSNAP_CACHE_TTL_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "ADSNAP_REQUEST_TIMEOUT_SECS";
pub const ENV_JOURNAL: &str = "ADSNAP_JOURNAL";

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Append-only JSON-lines journal of call records.
    #[serde(default)]
    pub journal: Option<PathBuf>,
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Base URL (default: https://engine.prod.bria-api.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes (default: 10 MiB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u64 {
    3600
}

fn default_max_entries() -> u64 {
    1_000
}

impl Config {
    /// Load from file (see module docs), then apply environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides; no file is read.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AdsnapError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            AdsnapError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        if config.api.request_timeout_secs == 0 {
            return Err(AdsnapError::Configuration(format!(
                "{path:?}: api.request_timeout_secs must be at least 1"
            )));
        }
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(AdsnapError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(dirs::home_dir()
            .map(|home| home.join(".adsnap").join("config.toml"))
            .filter(|path| path.exists()))
    }

    /// Apply overrides from `lookup` (the process environment in
    /// production, a map in tests). Blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(raw) = get(ENV_MAX_FILE_SIZE) {
            self.limits.max_file_size = parse_number(ENV_MAX_FILE_SIZE, &raw)?;
        }
        if let Some(raw) = get(ENV_CACHE_TTL) {
            self.cache.ttl_secs = parse_number(ENV_CACHE_TTL, &raw)?;
        }
        if let Some(raw) = get(ENV_REQUEST_TIMEOUT) {
            let secs = parse_number(ENV_REQUEST_TIMEOUT, &raw)?;
            if secs == 0 {
                return Err(AdsnapError::Configuration(format!(
                    "{ENV_REQUEST_TIMEOUT} must be at least 1, got {raw:?}"
                )));
            }
            self.api.request_timeout_secs = secs;
        }
        if let Some(path) = get(ENV_JOURNAL) {
            self.journal = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api.api_key.is_some()
    }

    pub fn constraints(&self) -> Constraints {
        Constraints::default().max_file_size(self.limits.max_file_size)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Cache settings, or `None` when caching is disabled.
    pub fn cache_config(&self) -> Option<CacheConfig> {
        self.cache.enabled.then(|| {
            CacheConfig::new()
                .max_entries(self.cache.max_entries)
                .ttl(Duration::from_secs(self.cache.ttl_secs))
        })
    }
}

fn parse_number(var: &str, raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| {
        AdsnapError::Configuration(format!("{var} must be a non-negative integer, got {raw:?}"))
    })
}
