// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = PulseError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write config {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("no tokio runtime to run deliveries on")]
    NoRuntime,

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
