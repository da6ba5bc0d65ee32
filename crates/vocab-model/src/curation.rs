use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationKind {
    Accept,
    Reject,
    Modify,
    Defer,
}

impl CurationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Modify => "modify",
            Self::Defer => "defer",
        }
    }
}

/// One entry of the append-only curation audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationAction {
    pub action: CurationKind,
    pub dataset: String,
    pub native_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub curator: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifications: BTreeMap<String, String>,
}
