//! Persisted layer documents.
//!
//! Seed, harvest and overrides layers share one shape: four record
//! categories keyed by id. Documents are validated when parsed so that a
//! malformed record is rejected at load time instead of leaking partial data
//! into the merged view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::variable::CanonicalVariable;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerDocument {
    #[serde(default)]
    pub variables: BTreeMap<String, CanonicalVariable>,
    #[serde(default)]
    pub units: BTreeMap<String, UnitRecord>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodRecord>,
    #[serde(default)]
    pub qc_flags: BTreeMap<String, QcFlagRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodRecord {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QcFlagRecord {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl LayerDocument {
    /// Parses and validates a layer document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut document: Self = serde_json::from_str(raw)?;
        document.validate()?;
        Ok(document)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fills missing variable ids from their keys and rejects inconsistent
    /// records.
    pub fn validate(&mut self) -> Result<()> {
        for (key, variable) in &mut self.variables {
            if variable.id.is_empty() {
                variable.id = key.clone();
            } else if &variable.id != key {
                return Err(ModelError::IdMismatch {
                    key: key.clone(),
                    id: variable.id.clone(),
                });
            }
            if variable.label.trim().is_empty() {
                return Err(ModelError::EmptyLabel { id: key.clone() });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
            && self.units.is_empty()
            && self.methods.is_empty()
            && self.qc_flags.is_empty()
    }

    /// Inserts a variable under its own id, replacing any previous record.
    pub fn insert_variable(&mut self, variable: CanonicalVariable) {
        self.variables.insert(variable.id.clone(), variable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_are_filled_from_keys() {
        let raw = r#"{"variables": {"water:discharge_cfs": {"label": "Discharge"}}}"#;
        let document = LayerDocument::from_json(raw).expect("parse layer");
        let variable = &document.variables["water:discharge_cfs"];
        assert_eq!(variable.id, "water:discharge_cfs");
        assert!(document.units.is_empty());
    }

    #[test]
    fn mismatched_ids_are_rejected() {
        let raw = r#"{"variables": {"a": {"id": "b", "label": "Thing"}}}"#;
        let error = LayerDocument::from_json(raw).unwrap_err();
        assert!(matches!(error, ModelError::IdMismatch { .. }));
    }

    #[test]
    fn empty_labels_are_rejected() {
        let raw = r#"{"variables": {"a": {"label": "  "}}}"#;
        assert!(matches!(
            LayerDocument::from_json(raw),
            Err(ModelError::EmptyLabel { .. })
        ));
    }

    #[test]
    fn wrong_field_types_are_rejected() {
        let raw = r#"{"variables": {"a": {"label": 12}}}"#;
        assert!(matches!(
            LayerDocument::from_json(raw),
            Err(ModelError::Json(_))
        ));
    }
}
