//! Term broker implementation.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use vocab_model::{MatchSuggestion, NativeParameter, RuleBook, RulePack};
use vocab_registry::MergedRegistry;
use vocab_units::UnitAlgebra;

use crate::confidence::{Classification, ConfidenceBand, MatchThresholds};
use crate::index::LabelIndex;
use crate::normalize::normalize_label;
use crate::score::{
    CandidateScore, DOMAIN_MATCH_SCORE, EXACT_MAP_SCORE, LABEL_CONTAINED_SCORE,
    LABEL_CONTAINS_SCORE, LABEL_EXACT_SCORE, LABEL_HINT_SCORE, UNIT_CONVERTIBLE_SCORE,
    UNIT_EQUAL_SCORE,
};

/// Result of matching one dataset's parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Matches at or above the auto-accept threshold, one per
    /// `(dataset, native_id)`.
    pub accepted: Vec<MatchSuggestion>,
    /// Matches between the suggest and auto-accept thresholds.
    pub suggested: Vec<MatchSuggestion>,
}

impl MatchOutcome {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.suggested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns the count of matches in each confidence band.
    #[must_use]
    pub fn count_by_band(&self) -> BTreeMap<ConfidenceBand, usize> {
        let mut counts = BTreeMap::new();
        for suggestion in self.accepted.iter().chain(&self.suggested) {
            *counts
                .entry(ConfidenceBand::from_score(suggestion.score))
                .or_insert(0) += 1;
        }
        counts
    }

    /// Returns matches at or above `min_band`.
    #[must_use]
    pub fn filter_by_band(&self, min_band: ConfidenceBand) -> Vec<&MatchSuggestion> {
        self.accepted
            .iter()
            .chain(&self.suggested)
            .filter(|s| ConfidenceBand::from_score(s.score) >= min_band)
            .collect()
    }

    /// Average score over all matches. `None` when there are none.
    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let sum: f64 = self
            .accepted
            .iter()
            .chain(&self.suggested)
            .map(|s| s.score)
            .sum();
        Some(sum / total as f64)
    }

    /// Lowest score over all matches.
    #[must_use]
    pub fn min_score(&self) -> Option<f64> {
        self.scores().reduce(f64::min)
    }

    /// Highest score over all matches.
    #[must_use]
    pub fn max_score(&self) -> Option<f64> {
        self.scores().reduce(f64::max)
    }

    fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.accepted.iter().chain(&self.suggested).map(|s| s.score)
    }
}

/// Proposes canonical variables for native parameters.
///
/// Holds the per-dataset rule packs and classification thresholds. The
/// broker itself is stateless between calls; the registry view is passed
/// in so callers control when it is reloaded.
#[derive(Debug, Clone, Default)]
pub struct TermBroker {
    thresholds: MatchThresholds,
    rules: RuleBook,
}

impl TermBroker {
    pub fn new(rules: RuleBook) -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            rules,
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Matches every parameter of `dataset` against the registry.
    ///
    /// Each parameter contributes at most one suggestion, for its best
    /// scoring canonical variable. Parameters whose best score falls below
    /// the suggest threshold are left out of both lists.
    pub fn match_parameters(
        &self,
        dataset: &str,
        parameters: &[NativeParameter],
        registry: &MergedRegistry,
    ) -> MatchOutcome {
        let index = LabelIndex::build(registry);
        let pack = self.rules.get(dataset);
        let units = unit_algebra(pack);

        let mut accepted: BTreeMap<String, MatchSuggestion> = BTreeMap::new();
        let mut suggested: BTreeMap<String, MatchSuggestion> = BTreeMap::new();
        let mut dropped = 0usize;

        for parameter in parameters {
            let candidates = self.score_with(dataset, parameter, registry, &index, pack, &units);
            let Some(best) = candidates.into_iter().next() else {
                debug!(dataset, parameter = %parameter.id, "no candidate");
                dropped += 1;
                continue;
            };
            let score = best.score();
            let suggestion = MatchSuggestion {
                dataset: dataset.to_string(),
                native_id: parameter.id.clone(),
                native_label: parameter.label.clone(),
                native_unit: parameter.unit.clone(),
                canonical: best.canonical.clone(),
                score,
                reasons: best.reasons(),
            };
            debug!(
                dataset,
                parameter = %parameter.id,
                canonical = %best.canonical,
                score,
                explain = %best.explain(),
                "scored parameter"
            );
            match self.thresholds.classify(score) {
                Classification::Accept => keep_highest(&mut accepted, suggestion),
                Classification::Suggest => keep_highest(&mut suggested, suggestion),
                Classification::Drop => dropped += 1,
            }
        }

        // A key accepted through one occurrence never also waits for review.
        suggested.retain(|key, _| !accepted.contains_key(key));

        let outcome = MatchOutcome {
            accepted: accepted.into_values().collect(),
            suggested: suggested.into_values().collect(),
        };
        info!(
            dataset,
            parameters = parameters.len(),
            accepted = outcome.accepted.len(),
            suggested = outcome.suggested.len(),
            dropped,
            "matched parameters"
        );
        outcome
    }

    /// Scores one parameter against every candidate it touches.
    ///
    /// Returns candidates best first. Ties are broken by canonical id so
    /// the first entry is the one `match_parameters` would pick.
    pub fn score_parameter(
        &self,
        dataset: &str,
        parameter: &NativeParameter,
        registry: &MergedRegistry,
    ) -> Vec<CandidateScore> {
        let index = LabelIndex::build(registry);
        let pack = self.rules.get(dataset);
        let units = unit_algebra(pack);
        self.score_with(dataset, parameter, registry, &index, pack, &units)
    }

    fn score_with(
        &self,
        dataset: &str,
        parameter: &NativeParameter,
        registry: &MergedRegistry,
        index: &LabelIndex,
        pack: Option<&RulePack>,
        units: &UnitAlgebra,
    ) -> Vec<CandidateScore> {
        let mut candidates: BTreeMap<String, CandidateScore> = BTreeMap::new();

        if let Some(pack) = pack {
            if let Some(canonical) = pack.exact_map.get(&parameter.id) {
                if registry.contains(canonical) {
                    candidate(&mut candidates, canonical)
                        .add(format!("exact:{}", parameter.id), EXACT_MAP_SCORE);
                } else {
                    warn!(
                        dataset,
                        parameter = %parameter.id,
                        canonical = %canonical,
                        "exact map target is not in the registry"
                    );
                }
            }
            if let Some(hint) = pack.label_hints.get(&parameter.id) {
                for id in index.ids_with_label(&normalize_label(hint)) {
                    candidate(&mut candidates, id).add("label_hint", LABEL_HINT_SCORE);
                }
            }
        }

        let native_label = parameter
            .label
            .as_deref()
            .map(normalize_label)
            .unwrap_or_default();
        if !native_label.is_empty() {
            for (id, label) in index.entries() {
                if native_label == label {
                    candidate(&mut candidates, id).add("label:exact", LABEL_EXACT_SCORE);
                } else if native_label.contains(label) {
                    candidate(&mut candidates, id).add("label:contains", LABEL_CONTAINS_SCORE);
                } else if label.contains(native_label.as_str()) {
                    candidate(&mut candidates, id).add("label:contained", LABEL_CONTAINED_SCORE);
                }
            }
        }

        for (id, scored) in &mut candidates {
            let Some(variable) = registry.variable(id) else {
                continue;
            };
            if let (Some(native_unit), Some(preferred)) =
                (parameter.unit.as_deref(), variable.preferred_unit.as_deref())
            {
                if units.same_unit(native_unit, preferred) {
                    scored.add("unit:eq", UNIT_EQUAL_SCORE);
                } else if units.convertible(native_unit, preferred) {
                    scored.add("unit:convertible", UNIT_CONVERTIBLE_SCORE);
                }
            }
            if let (Some(native_domain), Some(domain)) =
                (parameter.domain.as_deref(), variable.domain.as_deref())
                && native_domain.trim().eq_ignore_ascii_case(domain.trim())
            {
                scored.add("domain:eq", DOMAIN_MATCH_SCORE);
            }
        }

        let mut ranked: Vec<CandidateScore> = candidates.into_values().collect();
        // Stable sort keeps id order among equal scores.
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranked
    }
}

fn unit_algebra(pack: Option<&RulePack>) -> UnitAlgebra {
    match pack {
        Some(pack) => UnitAlgebra::new().with_aliases(&pack.unit_aliases),
        None => UnitAlgebra::new(),
    }
}

fn candidate<'a>(
    candidates: &'a mut BTreeMap<String, CandidateScore>,
    id: &str,
) -> &'a mut CandidateScore {
    candidates
        .entry(id.to_string())
        .or_insert_with(|| CandidateScore::new(id))
}

fn keep_highest(slot: &mut BTreeMap<String, MatchSuggestion>, suggestion: MatchSuggestion) {
    let key = suggestion.key();
    match slot.get(&key) {
        Some(existing) if existing.score >= suggestion.score => {}
        _ => {
            slot.insert(key, suggestion);
        }
    }
}
