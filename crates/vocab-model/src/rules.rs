//! Per-dataset matching shortcuts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hand-authored shortcuts for one source.
///
/// Absence of a pack is legal; matching then relies on generic heuristics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulePack {
    /// Native id -> canonical id.
    #[serde(default)]
    pub exact_map: BTreeMap<String, String>,
    /// Extra unit spellings -> canonical unit spelling.
    #[serde(default)]
    pub unit_aliases: BTreeMap<String, String>,
    /// Native id -> label to look up among canonical labels.
    #[serde(default)]
    pub label_hints: BTreeMap<String, String>,
}

impl RulePack {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exact(mut self, native_id: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.exact_map.insert(native_id.into(), canonical.into());
        self
    }

    #[must_use]
    pub fn unit_alias(mut self, alias: impl Into<String>, unit: impl Into<String>) -> Self {
        self.unit_aliases.insert(alias.into(), unit.into());
        self
    }

    #[must_use]
    pub fn label_hint(mut self, native_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.label_hints.insert(native_id.into(), label.into());
        self
    }
}

/// Rule packs keyed by dataset identifier, assembled once by the integrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleBook {
    packs: BTreeMap<String, RulePack>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pack(mut self, dataset: impl Into<String>, pack: RulePack) -> Self {
        self.packs.insert(dataset.into(), pack);
        self
    }

    pub fn insert(&mut self, dataset: impl Into<String>, pack: RulePack) {
        self.packs.insert(dataset.into(), pack);
    }

    pub fn get(&self, dataset: &str) -> Option<&RulePack> {
        self.packs.get(dataset)
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
