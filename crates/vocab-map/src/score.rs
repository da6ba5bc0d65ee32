//! Explainable candidate scores.

use serde::Serialize;

use crate::confidence::ConfidenceBand;

pub const EXACT_MAP_SCORE: f64 = 0.95;
pub const LABEL_HINT_SCORE: f64 = 0.70;
pub const LABEL_EXACT_SCORE: f64 = 0.25;
/// Native label contains the canonical label.
pub const LABEL_CONTAINS_SCORE: f64 = 0.20;
/// Canonical label contains the native label.
pub const LABEL_CONTAINED_SCORE: f64 = 0.10;
pub const UNIT_EQUAL_SCORE: f64 = 0.03;
pub const UNIT_CONVERTIBLE_SCORE: f64 = 0.02;
pub const DOMAIN_MATCH_SCORE: f64 = 0.01;

/// Rounds a score to six decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 1e6).round() / 1e6
}

/// A single signal contributing to a candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    /// Reason string recorded on suggestions (e.g. `label:exact`).
    pub reason: String,
    /// Amount added to the score.
    pub value: f64,
}

/// Accumulated score for one canonical variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub canonical: String,
    pub components: Vec<ScoreComponent>,
}

impl CandidateScore {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            components: Vec::new(),
        }
    }

    pub fn add(&mut self, reason: impl Into<String>, value: f64) {
        self.components.push(ScoreComponent {
            reason: reason.into(),
            value,
        });
    }

    /// Sum of all components, rounded to six decimal places.
    pub fn score(&self) -> f64 {
        round_score(self.components.iter().map(|c| c.value).sum())
    }

    pub fn reasons(&self) -> Vec<String> {
        self.components.iter().map(|c| c.reason.clone()).collect()
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.score())
    }

    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{}: +{:.2}", c.reason, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sums_and_rounds() {
        let mut candidate = CandidateScore::new("discharge");
        candidate.add("exact:00060", EXACT_MAP_SCORE);
        candidate.add("unit:eq", UNIT_EQUAL_SCORE);
        assert_eq!(candidate.score(), 0.98);
        assert_eq!(candidate.reasons(), vec!["exact:00060", "unit:eq"]);
        assert_eq!(candidate.explain(), "exact:00060: +0.95; unit:eq: +0.03");
    }

    #[test]
    fn rounding_trims_float_noise() {
        assert_eq!(round_score(0.1 + 0.2), 0.3);
        assert_eq!(round_score(0.70 + 0.20 + 0.01), 0.91);
    }
}
