//! Backing stores for registry layers.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{RegistryError, Result};

/// Byte-level storage for one layer.
///
/// Writes always replace the whole layer; there are no partial or append
/// writes.
pub trait LayerStore: Send + Sync + fmt::Debug {
    /// Current contents, or `None` when the layer was never written.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the stored contents.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Human-readable location used in logs and errors.
    fn location(&self) -> String;
}

/// A layer stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayerStore for JsonFileStore {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read(&self.path)
            .map(Some)
            .map_err(|e| RegistryError::io("read", &self.path, e))
    }

    /// Writes to a temp file first, then renames it over the layer file.
    fn write(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| RegistryError::io("create directory", parent, e))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file =
            File::create(&temp_path).map_err(|e| RegistryError::io("create", &temp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| RegistryError::io("write", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| RegistryError::io("sync", &temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| RegistryError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "wrote layer file");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A layer held in memory, for tests and ephemeral registries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Mutex::new(None),
        }
    }

    /// A store pre-filled with `bytes`.
    pub fn with_contents(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Mutex::new(Some(bytes.into())),
        }
    }
}

impl LayerStore for MemoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        let guard = self.bytes.lock().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(guard.clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.bytes.lock().map_err(|_| RegistryError::LockPoisoned)?;
        *guard = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }
}
