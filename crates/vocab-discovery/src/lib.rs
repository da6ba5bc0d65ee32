//! Service discovery: pull a source's parameter catalog, match it against
//! the canonical registry and persist the results.

#![deny(unsafe_code)]

pub mod adapter;
pub mod cache;
pub mod domain;
pub mod engine;

pub use adapter::{Capabilities, CapabilityVariable, CatalogRecord, SourceAdapter};
pub use cache::{CatalogCache, DEFAULT_CACHE_TTL};
pub use domain::infer_domain;
pub use engine::{CatalogSource, DiscoveryOptions, DiscoveryReport, ServiceDiscoveryEngine};
