//! Unit algebra for environmental measurements.
//!
//! Unit strings are folded to one canonical spelling (`cfs` -> `ft3/s`,
//! `°C` -> `degC`) and values are converted between compatible units.
//! Nothing here fails: an unrecognized unit passes through verbatim and an
//! unconvertible pair yields `None`.

#![deny(unsafe_code)]

mod algebra;
mod convert;
mod dimension;
mod normalize;

pub use algebra::UnitAlgebra;
pub use dimension::Dimension;
pub use normalize::NormalizedUnit;

/// Normalizes a unit string with the built-in alias table.
pub fn normalize_unit(raw: &str) -> Option<NormalizedUnit> {
    UnitAlgebra::new().normalize(raw)
}

/// Returns true when a value in `from` can be expressed in `to`.
pub fn convertible(from: &str, to: &str) -> bool {
    UnitAlgebra::new().convertible(from, to)
}

/// Converts `value` from one unit to another.
pub fn convert(value: f64, from: &str, to: &str) -> Option<f64> {
    UnitAlgebra::new().convert(value, from, to)
}

/// Physical dimension of a unit, if it is in the built-in catalog.
pub fn dimension_of(unit: &str) -> Option<Dimension> {
    UnitAlgebra::new().dimension(unit)
}
