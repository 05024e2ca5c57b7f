//! Error types shared across seismo crates

use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{key} = {value} is out of range ({expected})")]
    OutOfRange {
        key: &'static str,
        value: String,
        expected: String,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Event sink write failures
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("event log is not open")]
    NotOpen,

    #[error("failed to append to event log: {0}")]
    Io(#[from] std::io::Error),
}
