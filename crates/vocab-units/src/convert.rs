//! Conversion between normalized unit symbols.
//!
//! Lookup order: identical symbols, affine temperature, the dimensional
//! catalog, then the cross-dimension pair table.

use crate::dimension::{is_temperature, linear_unit};

/// `(from, to, factor, offset)`: `to = from * factor + offset`.
///
/// Conventions that only hold for dilute aqueous samples, so they are kept
/// out of the dimensional catalog.
const LINEAR_PAIRS: &[(&str, &str, f64, f64)] = &[
    ("mg/L", "ppm", 1.0, 0.0),
    ("ug/L", "ppb", 1.0, 0.0),
    ("mg/L", "ppb", 1_000.0, 0.0),
    ("ug/L", "ppm", 1e-3, 0.0),
];

pub(crate) fn convert_symbols(value: f64, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(value);
    }
    if is_temperature(from) || is_temperature(to) {
        return convert_temperature(value, from, to);
    }
    if let (Some(source), Some(target)) = (linear_unit(from), linear_unit(to))
        && source.dimension == target.dimension
    {
        return Some(value * source.to_base / target.to_base);
    }
    convert_pair(value, from, to)
}

fn convert_pair(value: f64, from: &str, to: &str) -> Option<f64> {
    for (source, target, factor, offset) in LINEAR_PAIRS {
        if *source == from && *target == to {
            return Some(value * factor + offset);
        }
        if *source == to && *target == from {
            return Some((value - offset) / factor);
        }
    }
    None
}

fn convert_temperature(value: f64, from: &str, to: &str) -> Option<f64> {
    let celsius = match from {
        "degC" => value,
        "degF" => (value - 32.0) * 5.0 / 9.0,
        "K" => value - 273.15,
        _ => return None,
    };
    match to {
        "degC" => Some(celsius),
        "degF" => Some(celsius * 9.0 / 5.0 + 32.0),
        "K" => Some(celsius + 273.15),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_affine() {
        assert_eq!(convert_temperature(100.0, "degC", "degF"), Some(212.0));
        assert_eq!(convert_temperature(0.0, "degC", "K"), Some(273.15));
        assert_eq!(convert_temperature(32.0, "degF", "degC"), Some(0.0));
        assert_eq!(convert_temperature(1.0, "degC", "m"), None);
    }

    #[test]
    fn pair_table_is_used_in_both_directions() {
        assert_eq!(convert_symbols(2.5, "mg/L", "ppm"), Some(2.5));
        assert_eq!(convert_symbols(2.0, "ppb", "mg/L"), Some(0.002));
    }

    #[test]
    fn different_dimensions_do_not_convert() {
        assert_eq!(convert_symbols(1.0, "ft3/s", "mm"), None);
        assert_eq!(convert_symbols(1.0, "degC", "hPa"), None);
    }
}
