//! Configuration file management.
//!
//! Settings can come from three places, with clear precedence rules:
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (`getcertexpiry.toml` or specified with `--config`)
//! 3. Command-line arguments (highest priority)
//!
//! The target itself is always taken from the command line.
//!
//! # Example Configuration File
//!
//! ```toml
//! insecure = false
//! cert = "/etc/monitoring/client.pem"
//! key = "/etc/monitoring/client.key"
//! ca = "/etc/monitoring/internal-ca.pem"
//! timeout = 10
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tls::DEFAULT_TIMEOUT;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "getcertexpiry.toml";

/// Checker configuration.
///
/// All fields are optional to support partial configuration and merging.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Disable chain and hostname verification
    pub insecure: Option<bool>,
    /// Client certificate (PEM)
    pub cert: Option<PathBuf>,
    /// Client private key (PEM)
    pub key: Option<PathBuf>,
    /// Extra trust anchors (PEM)
    pub ca: Option<PathBuf>,
    /// Connect, read and write timeout in seconds
    pub timeout: Option<u64>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML or unknown keys
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Loads the explicit file if one is given, else the default file when it
    /// exists in the working directory, else an empty configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Config::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Config::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Config::default()),
        }
    }

    /// Configuration with every default filled in.
    pub fn defaults() -> Self {
        Config {
            insecure: Some(false),
            cert: None,
            key: None,
            ca: None,
            timeout: Some(DEFAULT_TIMEOUT.as_secs()),
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// For each field, if `other` has a value it overrides this config's value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.insecure.is_some() {
            self.insecure = other.insecure;
        }
        if other.cert.is_some() {
            self.cert = other.cert;
        }
        if other.key.is_some() {
            self.key = other.key;
        }
        if other.ca.is_some() {
            self.ca = other.ca;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        self
    }

    /// Effective timeout, rejecting zero.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match self.timeout {
            Some(0) => Err(ConfigError::Validation(
                "timeout must be at least 1 second".to_string(),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (out-of-range values)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
