use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use vocab_model::{CanonicalVariable, LayerDocument, MethodRecord, QcFlagRecord, UnitRecord};

/// Read-only overlay of the seed, harvest and overrides layers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MergedRegistry {
    pub variables: BTreeMap<String, CanonicalVariable>,
    pub units: BTreeMap<String, UnitRecord>,
    pub methods: BTreeMap<String, MethodRecord>,
    pub qc_flags: BTreeMap<String, QcFlagRecord>,
}

impl MergedRegistry {
    /// Shallow overlay of `layers` in order: a later layer's record replaces
    /// an earlier one with the same key, other keys are unioned.
    pub fn overlay<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a LayerDocument>,
    {
        let mut merged = Self::default();
        for layer in layers {
            overlay_category(&mut merged.variables, &layer.variables);
            overlay_category(&mut merged.units, &layer.units);
            overlay_category(&mut merged.methods, &layer.methods);
            overlay_category(&mut merged.qc_flags, &layer.qc_flags);
        }
        merged
    }

    pub fn variable(&self, id: &str) -> Option<&CanonicalVariable> {
        self.variables.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.variables.contains_key(id)
    }

    pub fn variables_in_domain<'a>(
        &'a self,
        domain: &'a str,
    ) -> impl Iterator<Item = &'a CanonicalVariable> + 'a {
        self.variables
            .values()
            .filter(move |variable| variable.domain.as_deref() == Some(domain))
    }

    /// Distinct domain tags across all variables.
    pub fn domains(&self) -> BTreeSet<&str> {
        self.variables
            .values()
            .filter_map(|variable| variable.domain.as_deref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

fn overlay_category<T: Clone>(target: &mut BTreeMap<String, T>, layer: &BTreeMap<String, T>) {
    for (key, record) in layer {
        target.insert(key.clone(), record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_win_and_keys_union() {
        let mut seed = LayerDocument::default();
        seed.insert_variable(CanonicalVariable::new("a", "A").with_unit("X"));
        seed.insert_variable(CanonicalVariable::new("b", "B"));
        let mut harvest = LayerDocument::default();
        harvest.insert_variable(CanonicalVariable::new("c", "C"));
        let mut overrides = LayerDocument::default();
        overrides.insert_variable(CanonicalVariable::new("a", "A").with_unit("Y"));

        let merged = MergedRegistry::overlay([&seed, &harvest, &overrides]);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.variable("a").and_then(|v| v.preferred_unit.as_deref()),
            Some("Y")
        );
    }

    #[test]
    fn domains_are_distinct() {
        let mut seed = LayerDocument::default();
        seed.insert_variable(CanonicalVariable::new("a", "A").with_domain("water"));
        seed.insert_variable(CanonicalVariable::new("b", "B").with_domain("water"));
        seed.insert_variable(CanonicalVariable::new("c", "C").with_domain("air"));
        seed.insert_variable(CanonicalVariable::new("d", "D"));
        let merged = MergedRegistry::overlay([&seed]);
        assert_eq!(merged.domains().into_iter().collect::<Vec<_>>(), ["air", "water"]);
        assert_eq!(merged.variables_in_domain("water").count(), 2);
    }
}
