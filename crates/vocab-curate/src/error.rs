//! Error types for configuration and curation.

use std::path::PathBuf;

use thiserror::Error;
use vocab_map::ThresholdError;
use vocab_registry::RegistryError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid matching thresholds")]
    Thresholds(#[from] ThresholdError),

    #[error("invalid config value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum CurationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to serialize {what}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CurationError>;
