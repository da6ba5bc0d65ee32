//! Registry error types.

use std::path::PathBuf;

use thiserror::Error;
use vocab_model::ModelError;

use crate::layer::LayerKind;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed over the layer file.
    #[error("failed to replace {target_path} with {temp_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes are not a valid layer document.
    #[error("invalid {layer} layer at {location}")]
    InvalidLayer {
        layer: LayerKind,
        location: String,
        #[source]
        source: ModelError,
    },

    /// A layer document could not be serialized.
    #[error("failed to serialize {layer} layer")]
    Serialization {
        layer: LayerKind,
        #[source]
        source: ModelError,
    },

    #[error("registry write lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
