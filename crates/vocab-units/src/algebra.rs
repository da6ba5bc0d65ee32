use std::collections::BTreeMap;

use crate::convert::convert_symbols;
use crate::dimension::{Dimension, is_temperature, linear_unit};
use crate::normalize::{NormalizedUnit, builtin, fold};

/// Unit normalizer and converter.
///
/// The default value only knows the built-in tables. Per-source spellings
/// (a rule pack's `unit_aliases`) are layered on with [`Self::with_aliases`]
/// and take precedence over the built-in aliases.
#[derive(Debug, Clone, Default)]
pub struct UnitAlgebra {
    extra: BTreeMap<String, String>,
}

impl UnitAlgebra {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds extra alias -> unit spellings. Targets may themselves be aliases.
    #[must_use]
    pub fn with_aliases<'a, I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (alias, target) in aliases {
            let resolved = match builtin(&fold(target)) {
                Some(symbol) => symbol.to_string(),
                None => target.trim().to_string(),
            };
            self.extra.insert(fold(alias), resolved);
        }
        self
    }

    /// Folds `raw` to its canonical spelling.
    ///
    /// Returns `None` only for blank input. Unrecognized units come back
    /// trimmed but otherwise unchanged, with `is_recognized() == false`.
    pub fn normalize(&self, raw: &str) -> Option<NormalizedUnit> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = fold(trimmed);
        if let Some(symbol) = self.extra.get(&key) {
            return Some(NormalizedUnit::recognized(symbol.clone()));
        }
        if let Some(symbol) = builtin(&key) {
            return Some(NormalizedUnit::recognized(symbol));
        }
        Some(NormalizedUnit::passthrough(trimmed))
    }

    /// True when both strings normalize to the same spelling.
    pub fn same_unit(&self, a: &str, b: &str) -> bool {
        match (self.normalize(a), self.normalize(b)) {
            (Some(a), Some(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }

    pub fn convertible(&self, from: &str, to: &str) -> bool {
        self.convert(1.0, from, to).is_some()
    }

    /// Converts `value`; `None` when either unit is blank or the pair is not
    /// convertible.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64> {
        let from = self.normalize(from)?;
        let to = self.normalize(to)?;
        let converted = convert_symbols(value, from.as_str(), to.as_str());
        if converted.is_none() {
            tracing::trace!(from = %from, to = %to, "no conversion between units");
        }
        converted
    }

    pub fn dimension(&self, unit: &str) -> Option<Dimension> {
        let symbol = self.normalize(unit)?;
        if is_temperature(symbol.as_str()) {
            return Some(Dimension::Temperature);
        }
        linear_unit(symbol.as_str()).map(|unit| unit.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_aliases_normalize() {
        let algebra = UnitAlgebra::new();
        assert_eq!(algebra.normalize("CFS").unwrap().as_str(), "ft3/s");
        assert_eq!(algebra.normalize("\u{b0}c").unwrap().as_str(), "degC");
        assert_eq!(algebra.normalize("\u{b5}g/L").unwrap().as_str(), "ug/L");
        assert!(algebra.normalize("   ").is_none());
    }

    #[test]
    fn unknown_units_pass_through() {
        let unit = UnitAlgebra::new().normalize(" NTU ").unwrap();
        assert_eq!(unit.as_str(), "NTU");
        assert!(!unit.is_recognized());
    }

    #[test]
    fn extra_aliases_take_precedence() {
        let aliases: BTreeMap<String, String> =
            [("cu. ft. per sec".to_string(), "cfs".to_string())].into();
        let algebra = UnitAlgebra::new().with_aliases(&aliases);
        let unit = algebra.normalize("Cu. Ft. per sec").unwrap();
        assert_eq!(unit.as_str(), "ft3/s");
        assert!(algebra.same_unit("cu. ft. per sec", "ft3/s"));
    }

    #[test]
    fn flow_converts_between_imperial_and_metric() {
        let algebra = UnitAlgebra::new();
        let cms = algebra.convert(100.0, "cfs", "m3/s").unwrap();
        assert!((cms - 2.8316846592).abs() < 1e-9);
        assert!(algebra.convertible("ft3/s", "L/s"));
        assert!(!algebra.convertible("ft3/s", "degC"));
    }

    #[test]
    fn dimensions_are_reported() {
        let algebra = UnitAlgebra::new();
        assert_eq!(algebra.dimension("Kelvin"), Some(Dimension::Temperature));
        assert_eq!(algebra.dimension("inches"), Some(Dimension::Length));
        assert_eq!(algebra.dimension("NTU"), None);
    }
}
