use serde::{Deserialize, Serialize};

use crate::delta::delta_key;

/// A proposed mapping of one native parameter onto a canonical variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    pub dataset: String,
    pub native_id: String,
    pub native_label: Option<String>,
    pub native_unit: Option<String>,
    /// Canonical variable id.
    pub canonical: String,
    /// Summed score; exceeds 1.0 when several signals agree.
    pub score: f64,
    /// Score contributions in the order they were applied.
    pub reasons: Vec<String>,
}

impl MatchSuggestion {
    /// `dataset:native_id`, the key used by the delta layer.
    pub fn key(&self) -> String {
        delta_key(&self.dataset, &self.native_id)
    }
}
