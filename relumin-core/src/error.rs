//! Error types for relumin-core

use std::io;
use thiserror::Error;

use crate::cluster::{NodesParseError, SlotRangeError};

/// Top-level library error
#[derive(Error, Debug)]
pub enum ReluminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Topology error: {0}")]
    Topology(#[from] NodesParseError),

    #[error("Slot error: {0}")]
    Slots(#[from] SlotRangeError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Errors raised while talking to a node
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Command {command} failed on {endpoint}: {source}")]
    Failed {
        endpoint: String,
        command: String,
        #[source]
        source: redis::RedisError,
    },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ReluminError>;
