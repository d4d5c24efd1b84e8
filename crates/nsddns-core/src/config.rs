//! Configuration types for nsddns
//!
//! All settings are fixed at process start and never re-read.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::address::DEFAULT_MAX_ADDRESSES;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Domain suffix appended to every hostname (e.g. ".dyn.example.com")
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    /// Time-to-live of the records written, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Time budget for one run of the update tool, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum distinct addresses per hostname
    #[serde(default = "default_max_addresses")]
    pub max_addresses: usize,

    /// Path of the JSON password file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Path of the nsupdate executable
    #[serde(default = "default_nsupdate_path")]
    pub nsupdate_path: PathBuf,

    /// Arguments passed to nsupdate
    ///
    /// Defaults to `-l` (local mode, session key of the local server).
    #[serde(default = "default_nsupdate_args")]
    pub nsupdate_args: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ServerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            listen: default_listen(),
            domain_suffix: default_domain_suffix(),
            ttl: default_ttl(),
            timeout_secs: default_timeout_secs(),
            max_addresses: default_max_addresses(),
            credentials_path: default_credentials_path(),
            nsupdate_path: default_nsupdate_path(),
            nsupdate_args: default_nsupdate_args(),
            log_level: default_log_level(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain_suffix.is_empty() {
            return Err(crate::Error::config("Domain suffix cannot be empty"));
        }
        if !self.domain_suffix.starts_with('.') {
            return Err(crate::Error::config(format!(
                "Domain suffix must start with '.'. Got: {}",
                self.domain_suffix
            )));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "Update timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        if self.max_addresses == 0 {
            return Err(crate::Error::config("Maximum addresses per name must be > 0"));
        }
        if self.nsupdate_path.as_os_str().is_empty() {
            return Err(crate::Error::config("nsupdate path cannot be empty"));
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(format!(
                    "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        Ok(())
    }

    /// Update tool time budget
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings consumed by the request pipeline
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            domain_suffix: self.domain_suffix.clone(),
            max_addresses: self.max_addresses,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Request pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Domain suffix (also the Basic realm)
    pub domain_suffix: String,
    /// Maximum distinct addresses per hostname
    pub max_addresses: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
            max_addresses: default_max_addresses(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_domain_suffix() -> String {
    ".dyn.example.com".to_string()
}

fn default_ttl() -> u32 {
    180
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_max_addresses() -> usize {
    DEFAULT_MAX_ADDRESSES
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("/var/named/ddns-hosts.json")
}

fn default_nsupdate_path() -> PathBuf {
    PathBuf::from("/usr/bin/nsupdate")
}

fn default_nsupdate_args() -> Vec<String> {
    vec!["-l".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}
