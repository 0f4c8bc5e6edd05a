// src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

pub const DEFAULT_API_URL: &str = "https://your-domain.com/api/heartbeat";
pub const DEFAULT_BADGE_URL: &str = "https://your-domain.com/api/badge";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONFIG_PATH: &str = "pulse.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Persisted secret token; empty until first start.
    pub token: String,
    pub api_url: String,
    pub badge_url: String,
    /// Seconds between heartbeats.
    pub interval: u64,
    #[serde(rename = "send-software")]
    pub send_software: bool,
    pub debug: bool,
    /// Delivery timeout in seconds.
    pub timeout: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            badge_url: DEFAULT_BADGE_URL.to_string(),
            interval: DEFAULT_INTERVAL_SECS,
            send_software: true,
            debug: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PulseConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Applies `PULSE_*` environment overrides. Overrides live only in
    /// memory and are never written back to the store.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("PULSE_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("PULSE_BADGE_URL") {
            self.badge_url = v;
        }
        if let Some(v) = lookup("PULSE_INTERVAL") {
            self.interval = parse_secs("PULSE_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("PULSE_TIMEOUT") {
            self.timeout = parse_secs("PULSE_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("PULSE_SEND_SOFTWARE") {
            self.send_software = parse_bool("PULSE_SEND_SOFTWARE", &v)?;
        }
        if let Some(v) = lookup("PULSE_DEBUG") {
            self.debug = parse_bool("PULSE_DEBUG", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(invalid("interval", "0", "must be at least 1 second"));
        }
        if self.timeout == 0 {
            return Err(invalid("timeout", "0", "must be at least 1 second"));
        }
        if self.api_url.trim().is_empty() {
            return Err(invalid("api_url", "", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> PulseError {
    PulseError::InvalidSetting {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_secs(key: &'static str, v: &str) -> Result<u64> {
    match v.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, v, "expected a positive number of seconds")),
    }
}

fn parse_bool(key: &'static str, v: &str) -> Result<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, v, "expected true or false")),
    }
}

/// Where the host keeps [`PulseConfig`] between runs.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<PulseConfig>;
    fn save(&self, config: &PulseConfig) -> Result<()>;
}

/// TOML file store. A missing file is created with defaults on first load.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `PULSE_CONFIG`, else `pulse.toml` in the working directory.
    pub fn from_env() -> Self {
        Self::new(env::var("PULSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`], also reporting whether the defaults were
    /// just written because no file existed.
    pub fn load_or_init(&self) -> Result<(PulseConfig, bool)> {
        if !self.path.exists() {
            let config = PulseConfig::default();
            self.save(&config)?;
            return Ok((config, true));
        }
        Ok((self.read()?, false))
    }

    fn read(&self) -> Result<PulseConfig> {
        let content = fs::read_to_string(&self.path).map_err(|source| PulseError::ConfigRead {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| PulseError::ConfigParse {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<PulseConfig> {
        self.load_or_init().map(|(config, _)| config)
    }

    fn save(&self, config: &PulseConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        let write_err = |source| PulseError::ConfigWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        // write then rename so a crash never leaves a half-written token
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

/// In-process store for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: Mutex<PulseConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: PulseConfig) -> Self {
        Self {
            inner: Mutex::new(config),
        }
    }

    pub fn snapshot(&self) -> PulseConfig {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<PulseConfig> {
        Ok(self.snapshot())
    }

    fn save(&self, config: &PulseConfig) -> Result<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = config.clone();
        Ok(())
    }
}
