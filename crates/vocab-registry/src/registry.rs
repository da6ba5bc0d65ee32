use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use vocab_model::{DeltaLayer, LayerDocument, ModelError};

use crate::error::{RegistryError, Result};
use crate::hash::sha256_hex;
use crate::layer::{LayerFiles, LayerKind};
use crate::merge::MergedRegistry;
use crate::store::{JsonFileStore, LayerStore, MemoryStore};

/// The four registry layers plus a single-writer guard.
///
/// Every mutation (`write_*`, `update_*`) holds one registry-wide lock across
/// its read-modify-write, so writers sharing a registry (through an `Arc`)
/// cannot lose each other's updates. Separate `CanonicalRegistry` values
/// pointing at the same directory are not coordinated; a directory must have
/// exactly one owning value per process.
///
/// Readers are lock-free. `get_*` getters are lenient: an unreadable or
/// invalid layer is logged and treated as empty. `load_*` return the error
/// instead, and updates use them so that a corrupt file is never silently
/// replaced by an empty document.
#[derive(Debug)]
pub struct CanonicalRegistry {
    seed: Box<dyn LayerStore>,
    harvest: Box<dyn LayerStore>,
    overrides: Box<dyn LayerStore>,
    delta: Box<dyn LayerStore>,
    writer: Mutex<()>,
}

impl CanonicalRegistry {
    pub fn new(
        seed: Box<dyn LayerStore>,
        harvest: Box<dyn LayerStore>,
        overrides: Box<dyn LayerStore>,
        delta: Box<dyn LayerStore>,
    ) -> Self {
        Self {
            seed,
            harvest,
            overrides,
            delta,
            writer: Mutex::new(()),
        }
    }

    /// Opens a file-backed registry in `dir`, creating the directory if needed.
    ///
    /// Missing layer files are treated as empty layers.
    pub fn open(dir: impl AsRef<Path>, files: &LayerFiles) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| RegistryError::io("create directory", dir, e))?;
        let store = |kind: LayerKind| -> Box<dyn LayerStore> {
            Box::new(JsonFileStore::new(dir.join(files.file_name(kind))))
        };
        tracing::debug!(dir = %dir.display(), "opened registry");
        Ok(Self::new(
            store(LayerKind::Seed),
            store(LayerKind::Harvest),
            store(LayerKind::Overrides),
            store(LayerKind::Delta),
        ))
    }

    /// A registry whose layers live only in memory.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryStore::new("seed")),
            Box::new(MemoryStore::new("harvest")),
            Box::new(MemoryStore::new("overrides")),
            Box::new(MemoryStore::new("delta")),
        )
    }

    fn store(&self, kind: LayerKind) -> &dyn LayerStore {
        match kind {
            LayerKind::Seed => self.seed.as_ref(),
            LayerKind::Harvest => self.harvest.as_ref(),
            LayerKind::Overrides => self.overrides.as_ref(),
            LayerKind::Delta => self.delta.as_ref(),
        }
    }

    /// Location of every layer's backing store.
    pub fn locations(&self) -> BTreeMap<LayerKind, String> {
        LayerKind::ALL
            .into_iter()
            .map(|kind| (kind, self.store(kind).location()))
            .collect()
    }

    // ---------------------------------------------------------------------
    // strict loads
    // ---------------------------------------------------------------------

    pub fn load_seed(&self) -> Result<LayerDocument> {
        self.read_document(LayerKind::Seed)
    }

    pub fn load_harvest(&self) -> Result<LayerDocument> {
        self.read_document(LayerKind::Harvest)
    }

    pub fn load_overrides(&self) -> Result<LayerDocument> {
        self.read_document(LayerKind::Overrides)
    }

    pub fn load_delta(&self) -> Result<DeltaLayer> {
        let Some(raw) = self.read_text(LayerKind::Delta)? else {
            return Ok(DeltaLayer::default());
        };
        DeltaLayer::from_json(&raw).map_err(|source| self.invalid(LayerKind::Delta, source))
    }

    // ---------------------------------------------------------------------
    // lenient getters
    // ---------------------------------------------------------------------

    pub fn get_seed(&self) -> LayerDocument {
        lenient(LayerKind::Seed, self.load_seed())
    }

    pub fn get_harvest(&self) -> LayerDocument {
        lenient(LayerKind::Harvest, self.load_harvest())
    }

    pub fn get_overrides(&self) -> LayerDocument {
        lenient(LayerKind::Overrides, self.load_overrides())
    }

    pub fn get_delta(&self) -> DeltaLayer {
        lenient(LayerKind::Delta, self.load_delta())
    }

    // ---------------------------------------------------------------------
    // writes
    // ---------------------------------------------------------------------

    pub fn write_seed(&self, document: &LayerDocument) -> Result<()> {
        let _guard = self.lock()?;
        self.write_document(LayerKind::Seed, document)
    }

    pub fn write_harvest(&self, document: &LayerDocument) -> Result<()> {
        let _guard = self.lock()?;
        self.write_document(LayerKind::Harvest, document)
    }

    pub fn write_overrides(&self, document: &LayerDocument) -> Result<()> {
        let _guard = self.lock()?;
        self.write_document(LayerKind::Overrides, document)
    }

    pub fn write_delta(&self, delta: &DeltaLayer) -> Result<()> {
        let _guard = self.lock()?;
        self.write_delta_layer(delta)
    }

    /// Read-modify-write of the seed layer under the writer lock.
    ///
    /// The layer is only rewritten when `apply` changed it.
    pub fn update_seed<T>(&self, apply: impl FnOnce(&mut LayerDocument) -> T) -> Result<T> {
        self.update_document(LayerKind::Seed, apply)
    }

    pub fn update_harvest<T>(&self, apply: impl FnOnce(&mut LayerDocument) -> T) -> Result<T> {
        self.update_document(LayerKind::Harvest, apply)
    }

    pub fn update_overrides<T>(&self, apply: impl FnOnce(&mut LayerDocument) -> T) -> Result<T> {
        self.update_document(LayerKind::Overrides, apply)
    }

    pub fn update_delta<T>(&self, apply: impl FnOnce(&mut DeltaLayer) -> T) -> Result<T> {
        let _guard = self.lock()?;
        let mut delta = self.load_delta()?;
        let before = delta.clone();
        let out = apply(&mut delta);
        if delta != before {
            self.write_delta_layer(&delta)?;
        }
        Ok(out)
    }

    /// Read-modify-write of the overrides and delta layers together.
    ///
    /// Both layers are read and written under one hold of the writer lock,
    /// which is what promotion of a suggestion needs.
    pub fn update_curation<T>(
        &self,
        apply: impl FnOnce(&mut LayerDocument, &mut DeltaLayer) -> T,
    ) -> Result<T> {
        let _guard = self.lock()?;
        let mut overrides = self.load_overrides()?;
        let mut delta = self.load_delta()?;
        let overrides_before = overrides.clone();
        let delta_before = delta.clone();
        let out = apply(&mut overrides, &mut delta);
        if overrides != overrides_before {
            self.write_document(LayerKind::Overrides, &overrides)?;
        }
        if delta != delta_before {
            self.write_delta_layer(&delta)?;
        }
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // views
    // ---------------------------------------------------------------------

    /// `seed ⊕ harvest ⊕ overrides`, recomputed on every call.
    pub fn merged(&self) -> MergedRegistry {
        let seed = self.get_seed();
        let harvest = self.get_harvest();
        let overrides = self.get_overrides();
        MergedRegistry::overlay([&seed, &harvest, &overrides])
    }

    /// SHA-256 of a layer's stored bytes; `None` if never written.
    pub fn fingerprint(&self, kind: LayerKind) -> Result<Option<String>> {
        Ok(self.store(kind).read()?.map(|bytes| sha256_hex(&bytes)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    fn update_document<T>(
        &self,
        kind: LayerKind,
        apply: impl FnOnce(&mut LayerDocument) -> T,
    ) -> Result<T> {
        let _guard = self.lock()?;
        let mut document = self.read_document(kind)?;
        let before = document.clone();
        let out = apply(&mut document);
        if document != before {
            self.write_document(kind, &document)?;
        }
        Ok(out)
    }

    fn read_text(&self, kind: LayerKind) -> Result<Option<String>> {
        let Some(bytes) = self.store(kind).read()? else {
            return Ok(None);
        };
        let raw = String::from_utf8(bytes).map_err(|e| {
            self.invalid(kind, ModelError::Message(format!("not UTF-8: {e}")))
        })?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    fn read_document(&self, kind: LayerKind) -> Result<LayerDocument> {
        let Some(raw) = self.read_text(kind)? else {
            return Ok(LayerDocument::default());
        };
        LayerDocument::from_json(&raw).map_err(|source| self.invalid(kind, source))
    }

    fn write_document(&self, kind: LayerKind, document: &LayerDocument) -> Result<()> {
        let json = document
            .to_json_pretty()
            .map_err(|source| RegistryError::Serialization { layer: kind, source })?;
        self.store(kind).write(json.as_bytes())?;
        tracing::debug!(layer = %kind, variables = document.variables.len(), "layer written");
        Ok(())
    }

    fn write_delta_layer(&self, delta: &DeltaLayer) -> Result<()> {
        let json = delta.to_json_pretty().map_err(|source| RegistryError::Serialization {
            layer: LayerKind::Delta,
            source,
        })?;
        self.store(LayerKind::Delta).write(json.as_bytes())?;
        tracing::debug!(entries = delta.len(), "delta layer written");
        Ok(())
    }

    fn invalid(&self, kind: LayerKind, source: ModelError) -> RegistryError {
        RegistryError::InvalidLayer {
            layer: kind,
            location: self.store(kind).location(),
            source,
        }
    }
}

fn lenient<T: Default>(kind: LayerKind, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(layer = %kind, %error, "layer unreadable, using empty layer");
            T::default()
        }
    }
}
