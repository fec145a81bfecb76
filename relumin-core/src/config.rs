use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Log output formats understood by [`crate::logging::init_logging`]
pub const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReluminConfig {
    pub logging: LoggingConfig,
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read/write timeout for a single command (milliseconds)
    pub response_timeout_ms: u64,

    /// Endpoint used when none is given on the command line
    pub default_endpoint: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 2000,
            response_timeout_ms: 5000,
            default_endpoint: None,
        }
    }
}

impl ReluminConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: ReluminConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                value: self.logging.format.clone(),
            });
        }
        if self.redis.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "redis.connect_timeout_ms",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

impl RedisConfig {
    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Get command timeout as Duration
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
