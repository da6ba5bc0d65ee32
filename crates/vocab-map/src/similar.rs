//! Fuzzy label lookup for reviewers.
//!
//! Jaro-Winkler similarity is only used to surface alternatives when a
//! curator inspects a suggestion. It never contributes to a match score.

use std::cmp::Ordering;

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;
use vocab_registry::MergedRegistry;

use crate::normalize::normalize_label;

/// Minimum similarity for a label to be listed.
pub const SIMILARITY_FLOOR: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarLabel {
    pub canonical: String,
    pub label: String,
    pub similarity: f64,
}

/// Returns up to `limit` canonical variables whose labels resemble `query`,
/// most similar first.
pub fn similar_labels(query: &str, registry: &MergedRegistry, limit: usize) -> Vec<SimilarLabel> {
    let query = normalize_label(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }
    let mut matches: Vec<SimilarLabel> = registry
        .variables
        .iter()
        .filter_map(|(id, variable)| {
            let label = normalize_label(&variable.label);
            if label.is_empty() {
                return None;
            }
            let similarity = jaro_winkler::similarity(query.chars(), label.chars());
            (similarity >= SIMILARITY_FLOOR).then(|| SimilarLabel {
                canonical: id.clone(),
                label: variable.label.clone(),
                similarity,
            })
        })
        .collect();
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.canonical.cmp(&b.canonical))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_model::CanonicalVariable;

    fn registry() -> MergedRegistry {
        let mut merged = MergedRegistry::default();
        for (id, label) in [
            ("water_temperature", "Water temperature"),
            ("air_temperature", "Air temperature"),
            ("discharge", "Streamflow"),
        ] {
            merged
                .variables
                .insert(id.to_string(), CanonicalVariable::new(id, label));
        }
        merged
    }

    #[test]
    fn closest_label_first() {
        let found = similar_labels("water temp", &registry(), 5);
        assert_eq!(found[0].canonical, "water_temperature");
        assert!(found.iter().all(|m| m.canonical != "discharge"));
    }

    #[test]
    fn blank_query_finds_nothing() {
        assert!(similar_labels("  ", &registry(), 5).is_empty());
        assert!(similar_labels("water", &registry(), 0).is_empty());
    }
}
