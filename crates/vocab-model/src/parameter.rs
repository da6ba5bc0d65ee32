use serde::{Deserialize, Serialize};

/// A source-specific parameter as reported by one data service.
///
/// Built per discovery run from adapter output; never persisted directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeParameter {
    pub dataset: String,
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl NativeParameter {
    pub fn new(dataset: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}
