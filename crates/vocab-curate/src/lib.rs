//! Curation of the canonical registry.
//!
//! [`RegistryCurator`] is the human-facing review workflow over the delta
//! layer. [`AutoCurationPipeline`] composes discovery and curation into a
//! scheduled run.

#![deny(unsafe_code)]

pub mod config;
pub mod curator;
pub mod error;
pub mod pipeline;

pub use config::{
    CurationSettings, DiscoverySettings, MatchingSettings, REGISTRY_DIR_ENV, RegistrySettings,
    VocabConfig,
};
pub use curator::{BatchOutcome, RegistryCurator, ReviewFilter, ReviewItem};
pub use error::{ConfigError, CurationError, Result};
pub use pipeline::{AutoCurationPipeline, DiscoveryTotals, NightlySummary};
