//! Configuration module for hostsweep

use crate::ScanError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const MIN_WORKER_POOL_SIZE: usize = 1;
pub const MAX_WORKER_POOL_SIZE: usize = 100;
pub const MIN_HOST_TIMEOUT_SECONDS: u64 = 5;
pub const MAX_HOST_TIMEOUT_SECONDS: u64 = 300;
pub const MIN_TOP_PORTS: u16 = 1;
pub const MAX_TOP_PORTS: u16 = 1000;

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of detailed host scans allowed to run at once
    pub worker_pool_size: usize,

    /// Time budget for one detailed host scan, in seconds
    pub host_timeout_seconds: u64,

    /// How many of the most common ports the detailed scan probes
    pub top_ports: u16,

    /// Path or name of the nmap binary
    pub nmap_path: String,

    /// Time budget for the discovery sweep, in seconds
    pub discovery_timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 20,
            host_timeout_seconds: 30,
            top_ports: 20,
            nmap_path: "nmap".to_string(),
            discovery_timeout_seconds: 300, // sweeping a /16 can take minutes
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }

    pub fn with_host_timeout_seconds(mut self, seconds: u64) -> Self {
        self.host_timeout_seconds = seconds;
        self
    }

    pub fn with_top_ports(mut self, top_ports: u16) -> Self {
        self.top_ports = top_ports;
        self
    }

    pub fn with_nmap_path(mut self, path: impl Into<String>) -> Self {
        self.nmap_path = path.into();
        self
    }

    pub fn with_discovery_timeout_seconds(mut self, seconds: u64) -> Self {
        self.discovery_timeout_seconds = seconds;
        self
    }

    pub fn host_timeout(&self) -> Duration {
        Duration::from_secs(self.host_timeout_seconds)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_seconds)
    }

    /// Load configuration from a TOML file and validate it
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScanError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ScanConfig = toml::from_str(&content)
            .map_err(|e| ScanError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `~/.hostsweep.toml` if present, otherwise the defaults
    pub fn load_default_config() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let config_path = home_dir.join(".hostsweep.toml");

        if config_path.exists() {
            match Self::from_toml_file(&config_path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", config_path.display(), e);
                }
            }
        }

        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if !(MIN_WORKER_POOL_SIZE..=MAX_WORKER_POOL_SIZE).contains(&self.worker_pool_size) {
            return Err(ScanError::ConfigError(format!(
                "worker_pool_size must be between {} and {}, got {}",
                MIN_WORKER_POOL_SIZE, MAX_WORKER_POOL_SIZE, self.worker_pool_size
            )));
        }

        if !(MIN_HOST_TIMEOUT_SECONDS..=MAX_HOST_TIMEOUT_SECONDS).contains(&self.host_timeout_seconds) {
            return Err(ScanError::ConfigError(format!(
                "host_timeout_seconds must be between {} and {}, got {}",
                MIN_HOST_TIMEOUT_SECONDS, MAX_HOST_TIMEOUT_SECONDS, self.host_timeout_seconds
            )));
        }

        if !(MIN_TOP_PORTS..=MAX_TOP_PORTS).contains(&self.top_ports) {
            return Err(ScanError::ConfigError(format!(
                "top_ports must be between {} and {}, got {}",
                MIN_TOP_PORTS, MAX_TOP_PORTS, self.top_ports
            )));
        }

        if self.nmap_path.trim().is_empty() {
            return Err(ScanError::ConfigError("nmap_path cannot be empty".to_string()));
        }

        if self.discovery_timeout_seconds == 0 {
            return Err(ScanError::ConfigError(
                "discovery_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
