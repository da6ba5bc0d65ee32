//! Contract between the discovery engine and external data-service adapters.

use serde::{Deserialize, Serialize};
use vocab_model::NativeParameter;

/// One entry of a source's structured parameter catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Source-native parameter code.
    #[serde(alias = "native_id", alias = "parameter_code", alias = "code")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
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

    /// Converts the record into matcher input. `fallback_domain` is used
    /// when the record carries no domain of its own.
    pub fn to_parameter(&self, dataset: &str, fallback_domain: Option<&str>) -> NativeParameter {
        NativeParameter {
            dataset: dataset.to_string(),
            id: self.id.trim().to_string(),
            label: non_blank(self.label.as_deref()),
            unit: non_blank(self.unit.as_deref()),
            domain: non_blank(self.domain.as_deref()).or_else(|| fallback_domain.map(str::to_string)),
        }
    }
}

/// Coarse capability listing offered by adapters without a structured
/// catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub variables: Vec<CapabilityVariable>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapabilityVariable {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub canonical: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Capabilities {
    /// Reinterprets the capability listing as a catalog. Entries with no
    /// usable identifier are skipped.
    pub fn into_records(self) -> Vec<CatalogRecord> {
        self.variables
            .into_iter()
            .filter_map(|variable| {
                let id = non_blank(variable.platform.as_deref())
                    .or_else(|| non_blank(variable.canonical.as_deref()))?;
                Some(CatalogRecord {
                    id,
                    label: non_blank(variable.description.as_deref())
                        .or_else(|| non_blank(variable.label.as_deref())),
                    unit: non_blank(variable.unit.as_deref()),
                    ..CatalogRecord::default()
                })
            })
            .collect()
    }
}

/// An external data-service adapter.
///
/// Adapters implement at least one of [`harvest`](Self::harvest) and
/// [`capabilities`](Self::capabilities). Errors from either call are
/// contained by the discovery engine and never abort a batch.
pub trait SourceAdapter: Send + Sync {
    /// Dataset identifier used for rule-pack lookup and delta keys.
    fn dataset(&self) -> &str;

    /// Structured parameter catalog. `Ok(None)` means the adapter has no
    /// structured catalog and capabilities should be used instead.
    fn harvest(&self) -> anyhow::Result<Option<Vec<CatalogRecord>>> {
        Ok(None)
    }

    fn capabilities(&self) -> anyhow::Result<Capabilities> {
        Ok(Capabilities::default())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_ids_prefer_platform_code() {
        let capabilities = Capabilities {
            variables: vec![
                CapabilityVariable {
                    platform: Some("00060".into()),
                    canonical: Some("water:discharge".into()),
                    description: Some("Discharge".into()),
                    unit: Some("ft3/s".into()),
                    ..CapabilityVariable::default()
                },
                CapabilityVariable {
                    canonical: Some("temp".into()),
                    label: Some("Temperature".into()),
                    ..CapabilityVariable::default()
                },
                CapabilityVariable {
                    description: Some("no identifier".into()),
                    ..CapabilityVariable::default()
                },
            ],
        };

        let records = capabilities.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "00060");
        assert_eq!(records[0].label.as_deref(), Some("Discharge"));
        assert_eq!(records[1].id, "temp");
        assert_eq!(records[1].label.as_deref(), Some("Temperature"));
    }

    #[test]
    fn record_domain_wins_over_fallback() {
        let record = CatalogRecord::new(" 00010 ").with_domain("water").with_unit("  ");
        let parameter = record.to_parameter("SITE", Some("air"));
        assert_eq!(parameter.id, "00010");
        assert_eq!(parameter.domain.as_deref(), Some("water"));
        assert_eq!(parameter.unit, None);

        let parameter = CatalogRecord::new("x").to_parameter("SITE", Some("air"));
        assert_eq!(parameter.domain.as_deref(), Some("air"));
    }
}
