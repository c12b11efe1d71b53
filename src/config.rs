//! Configuration loading using Figment
//!
//! Settings are merged from, in increasing precedence:
//! 1. built-in defaults
//! 2. a TOML file (`config/pulsar.toml` by default)
//! 3. environment variables prefixed with `PULSAR_`, with `__` separating
//!    the section from the key
//!
//! ```text
//! PULSAR_SERIAL__ADDRESS=/dev/ttyUSB3
//! PULSAR_SERIAL__BAUD_RATE=19200
//! PULSAR_APPLICATION__LOG_LEVEL=debug
//! ```
//!
//! # Example file
//!
//! ```toml
//! [application]
//! name = "pulsar"
//! log_level = "info"
//!
//! [serial]
//! address = "/dev/ttyUSB0"
//! baud_rate = 9600
//! timeout_ms = 1000
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppResult, PulsarError};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/pulsar.toml";

/// Top-level driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulsarConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Serial line to the device
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Instrument name used in log messages and snapshots
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial line configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0", "COM3")
    #[serde(default)]
    pub address: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_name() -> String {
    "pulsar".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    1000
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl PulsarConfig {
    /// Configuration for a device at `address` with all other settings at
    /// their defaults.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            serial: SerialConfig {
                address: address.into(),
                ..SerialConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load from [`DEFAULT_CONFIG_PATH`] and the environment.
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply. The merged result is validated before it is returned.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The merged providers, for callers that layer further overrides
    /// before extracting and validating.
    pub fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PULSAR_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        if !VALID_LOG_LEVELS.contains(&self.application.log_level.as_str()) {
            return Err(PulsarError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.serial.address.trim().is_empty() {
            return Err(PulsarError::Configuration(
                "'serial.address' cannot be empty".to_string(),
            ));
        }

        if self.serial.baud_rate == 0 {
            return Err(PulsarError::Configuration(
                "'serial.baud_rate' must be > 0".to_string(),
            ));
        }

        if self.serial.timeout_ms == 0 {
            return Err(PulsarError::Configuration(
                "'serial.timeout_ms' must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
