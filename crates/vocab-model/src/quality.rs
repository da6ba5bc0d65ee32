//! Registry data-quality report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of domains a fully covered registry is expected to span.
pub const EXPECTED_DOMAIN_COUNT: usize = 7;

/// Aggregate completeness counts over the merged registry.
///
/// Recomputed on demand; never stored as authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub total_variables: usize,
    pub missing_uris: usize,
    pub missing_units: usize,
    /// Variable count per domain tag.
    pub coverage_by_domain: BTreeMap<String, usize>,
    /// Variables without a domain tag.
    pub unassigned_domain: usize,
    /// Pending delta entries at report time.
    pub pending_suggestions: usize,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    /// Share of variables with an observed-property URI (0.0 when empty).
    pub fn uri_completeness(&self) -> f64 {
        completeness(self.total_variables, self.missing_uris)
    }

    /// Share of variables with a preferred unit (0.0 when empty).
    pub fn unit_completeness(&self) -> f64 {
        completeness(self.total_variables, self.missing_units)
    }

    pub fn distinct_domains(&self) -> usize {
        self.coverage_by_domain.len()
    }

    /// Single 0-100 score: 40% URIs, 40% units, 20% domain breadth.
    pub fn quality_score(&self) -> f64 {
        let breadth = (self.distinct_domains() as f64 / EXPECTED_DOMAIN_COUNT as f64).min(1.0);
        100.0 * (0.4 * self.uri_completeness() + 0.4 * self.unit_completeness() + 0.2 * breadth)
    }
}

fn completeness(total: usize, missing: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    1.0 - (missing.min(total) as f64 / total as f64)
}
