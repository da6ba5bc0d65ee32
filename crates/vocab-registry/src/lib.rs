//! Layered canonical variable registry.
//!
//! Four layers are kept in independent stores:
//!
//! - `seed`: curated baseline
//! - `harvest`: machine-discovered entries
//! - `overrides`: human- or auto-accepted entries
//! - `delta`: pending suggestions keyed by `dataset:native_id`
//!
//! [`CanonicalRegistry::merged`] overlays `seed`, `harvest` and `overrides`
//! (later layers win per key). The delta layer never takes part in the merge.

#![deny(unsafe_code)]

mod error;
mod hash;
mod layer;
mod merge;
mod registry;
mod store;

pub use error::{RegistryError, Result};
pub use hash::sha256_hex;
pub use layer::{LayerFiles, LayerKind};
pub use merge::MergedRegistry;
pub use registry::CanonicalRegistry;
pub use store::{JsonFileStore, LayerStore, MemoryStore};
