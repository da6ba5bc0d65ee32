//! Canonical variable records shared by every registry layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source-independent variable that native parameters are mapped onto.
///
/// The `id` doubles as the key of the owning layer's `variables` map. When a
/// layer file omits it, the key is copied in during validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalVariable {
    /// Globally unique key such as `water:discharge_cfs`.
    #[serde(default)]
    pub id: String,
    /// Human-readable label used for label matching.
    pub label: String,
    /// Unit values should be converted to before merging sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_unit: Option<String>,
    /// Ontology URI of the observed property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_property_uri: Option<String>,
    /// Ontology URI of the preferred unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_uri: Option<String>,
    /// Coarse category tag (`water`, `air`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Per-dataset bindings of native parameters to this variable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub datasets: BTreeMap<String, DatasetBinding>,
}

impl CanonicalVariable {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.preferred_unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_property_uri(mut self, uri: impl Into<String>) -> Self {
        self.observed_property_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_unit_uri(mut self, uri: impl Into<String>) -> Self {
        self.unit_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Binding of this variable for a dataset, if any.
    pub fn binding(&self, dataset: &str) -> Option<&DatasetBinding> {
        self.datasets.get(dataset)
    }

    pub fn has_property_uri(&self) -> bool {
        self.observed_property_uri
            .as_deref()
            .is_some_and(|uri| !uri.trim().is_empty())
    }

    pub fn has_preferred_unit(&self) -> bool {
        self.preferred_unit
            .as_deref()
            .is_some_and(|unit| !unit.trim().is_empty())
    }
}

/// How one dataset's native parameter is bound to a canonical variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetBinding {
    /// Source-native parameter code.
    pub native: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    /// Set when discovery promoted the match without human review.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifications: BTreeMap<String, String>,
}

impl DatasetBinding {
    pub fn new(native: impl Into<String>) -> Self {
        Self {
            native: native.into(),
            ..Self::default()
        }
    }

    /// True when a person made (or confirmed) this binding.
    pub fn is_curated(&self) -> bool {
        self.curator.is_some()
    }
}
