//! Application configuration: provider endpoints and resolution policy.
//! Loaded from YAML; every field has a default so no file is required.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app";
pub const NBU_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange";
pub const BACKUP_URL: &str = "https://api.exchangerate.host";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub frankfurter: Option<ProviderEndpoint>,
    pub nbu: Option<ProviderEndpoint>,
    pub backup: Option<ProviderEndpoint>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolicyConfig {
    /// Per-attempt HTTP timeout, seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Total attempts per upstream, first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles afterwards.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// How many days the date resolver may walk back.
    #[serde(default = "default_fallback_window_days")]
    pub fallback_window_days: u32,
    /// How long a cached quote stays valid, seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_fallback_window_days() -> u32 {
    7
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            fallback_window_days: default_fallback_window_days(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl PolicyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "kursbot").context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.yml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&path.to_string_lossy())
    }

    pub fn load_from_path(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {path}"))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        debug!("Loaded config from {path}");
        Ok(config)
    }

    pub fn frankfurter_url(&self) -> &str {
        self.providers
            .frankfurter
            .as_ref()
            .map_or(FRANKFURTER_URL, |p| &p.base_url)
    }

    pub fn nbu_url(&self) -> &str {
        self.providers.nbu.as_ref().map_or(NBU_URL, |p| &p.base_url)
    }

    pub fn backup_url(&self) -> &str {
        self.providers
            .backup
            .as_ref()
            .map_or(BACKUP_URL, |p| &p.base_url)
    }
}
