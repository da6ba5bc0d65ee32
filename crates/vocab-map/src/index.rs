//! Normalized label lookup over a merged registry.

use std::collections::BTreeMap;

use vocab_registry::MergedRegistry;

use crate::normalize::normalize_label;

/// Canonical labels normalized once per matching run.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    labels: BTreeMap<String, String>,
    by_label: BTreeMap<String, Vec<String>>,
}

impl LabelIndex {
    pub fn build(registry: &MergedRegistry) -> Self {
        let mut index = Self::default();
        for (id, variable) in &registry.variables {
            let label = normalize_label(&variable.label);
            if label.is_empty() {
                continue;
            }
            index
                .by_label
                .entry(label.clone())
                .or_default()
                .push(id.clone());
            index.labels.insert(id.clone(), label);
        }
        index
    }

    /// Canonical ids whose normalized label equals `normalized`.
    pub fn ids_with_label(&self, normalized: &str) -> &[String] {
        self.by_label
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `(canonical id, normalized label)` pairs in id order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(id, label)| (id.as_str(), label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
