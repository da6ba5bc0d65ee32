//! Pending-suggestion (delta) layer.
//!
//! The delta layer is a holding area keyed by `dataset:native_id`. It never
//! takes part in the merged registry view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::suggestion::MatchSuggestion;

/// Builds the delta key for a dataset and native parameter id.
///
/// Dataset ids must not contain `:`; native ids may. [`DeltaLayer::validate`]
/// and [`DeltaLayer::try_insert`] enforce this so keys stay unambiguous.
pub fn delta_key(dataset: &str, native_id: &str) -> String {
    format!("{dataset}:{native_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl DeltaStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// One suggestion awaiting (or having received) a curation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaEntry {
    pub dataset: String,
    pub native_id: String,
    #[serde(default)]
    pub native_label: Option<String>,
    #[serde(default)]
    pub native_unit: Option<String>,
    pub suggested_canonical: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: DeltaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_canonical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defer_reason: Option<String>,
}

impl DeltaEntry {
    /// Creates a pending entry from a suggestion.
    pub fn pending(
        suggestion: &MatchSuggestion,
        domain: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            dataset: suggestion.dataset.clone(),
            native_id: suggestion.native_id.clone(),
            native_label: suggestion.native_label.clone(),
            native_unit: suggestion.native_unit.clone(),
            suggested_canonical: suggestion.canonical.clone(),
            confidence: suggestion.score,
            reasons: suggestion.reasons.clone(),
            created_at: now,
            status: DeltaStatus::Pending,
            domain,
            updated_at: None,
            accepted_at: None,
            accepted_canonical: None,
            curator: None,
            rejected_at: None,
            rejection_reason: None,
            deferred_at: None,
            defer_reason: None,
        }
    }

    pub fn key(&self) -> String {
        delta_key(&self.dataset, &self.native_id)
    }

    pub fn is_pending(&self) -> bool {
        self.status == DeltaStatus::Pending
    }

    /// True once a curator (or batch promotion) has decided this entry.
    pub fn is_decided(&self) -> bool {
        !self.is_pending()
    }
}

/// The whole delta layer, keyed by `dataset:native_id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeltaLayer {
    pub entries: BTreeMap<String, DeltaEntry>,
}

impl DeltaLayer {
    pub fn from_json(raw: &str) -> Result<Self> {
        let layer: Self = serde_json::from_str(raw)?;
        layer.validate()?;
        Ok(layer)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, entry) in &self.entries {
            check_dataset(&entry.dataset)?;
            if *key != entry.key() {
                return Err(ModelError::DeltaKeyMismatch {
                    key: key.clone(),
                    dataset: entry.dataset.clone(),
                    native_id: entry.native_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, dataset: &str, native_id: &str) -> Option<&DeltaEntry> {
        self.entries.get(&delta_key(dataset, native_id))
    }

    pub fn get_mut(&mut self, dataset: &str, native_id: &str) -> Option<&mut DeltaEntry> {
        self.entries.get_mut(&delta_key(dataset, native_id))
    }

    pub fn insert(&mut self, entry: DeltaEntry) {
        self.entries.insert(entry.key(), entry);
    }

    /// Like [`Self::insert`], but refuses dataset ids containing `:`.
    pub fn try_insert(&mut self, entry: DeltaEntry) -> Result<()> {
        check_dataset(&entry.dataset)?;
        self.insert(entry);
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = &DeltaEntry> {
        self.entries.values().filter(|entry| entry.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_dataset(dataset: &str) -> Result<()> {
    if dataset.contains(':') {
        return Err(ModelError::DatasetSeparator {
            dataset: dataset.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&DeltaStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let raw = r#"{
            "A:1": {
                "dataset": "B",
                "native_id": "1",
                "suggested_canonical": "x",
                "confidence": 0.7,
                "created_at": "2024-01-01T00:00:00Z"
            }
        }"#;
        assert!(matches!(
            DeltaLayer::from_json(raw),
            Err(ModelError::DeltaKeyMismatch { .. })
        ));
    }

    #[test]
    fn dataset_ids_cannot_contain_the_separator() {
        // "A:B" + "1" would share a key with "A" + "B:1".
        let raw = r#"{
            "A:B:1": {
                "dataset": "A:B",
                "native_id": "1",
                "suggested_canonical": "x",
                "confidence": 0.7,
                "created_at": "2024-01-01T00:00:00Z"
            }
        }"#;
        assert!(matches!(
            DeltaLayer::from_json(raw),
            Err(ModelError::DatasetSeparator { .. })
        ));

        let raw = r#"{
            "A:B:1": {
                "dataset": "A",
                "native_id": "B:1",
                "suggested_canonical": "x",
                "confidence": 0.7,
                "created_at": "2024-01-01T00:00:00Z"
            }
        }"#;
        let layer = DeltaLayer::from_json(raw).expect("colon in native id");
        assert!(layer.get("A", "B:1").is_some());

        let mut layer = DeltaLayer::default();
        let mut entry = layer_entry("A", "1");
        assert!(layer.try_insert(entry.clone()).is_ok());
        entry.dataset = "A:B".to_string();
        assert!(layer.try_insert(entry).is_err());
        assert_eq!(layer.len(), 1);
    }

    fn layer_entry(dataset: &str, native_id: &str) -> DeltaEntry {
        let suggestion = MatchSuggestion {
            dataset: dataset.to_string(),
            native_id: native_id.to_string(),
            native_label: None,
            native_unit: None,
            canonical: "x".to_string(),
            score: 0.7,
            reasons: Vec::new(),
        };
        DeltaEntry::pending(&suggestion, None, Utc::now())
    }

    #[test]
    fn status_defaults_to_pending() {
        let raw = r#"{
            "A:1": {
                "dataset": "A",
                "native_id": "1",
                "suggested_canonical": "x",
                "confidence": 0.7,
                "created_at": "2024-01-01T00:00:00Z"
            }
        }"#;
        let layer = DeltaLayer::from_json(raw).expect("parse delta");
        assert_eq!(layer.pending_count(), 1);
        assert!(layer.get("A", "1").is_some_and(DeltaEntry::is_pending));
    }
}
