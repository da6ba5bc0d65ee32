use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    VolumetricFlow,
    MassConcentration,
    Length,
    Temperature,
    Pressure,
    Speed,
    Conductivity,
    Ratio,
}

impl Dimension {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VolumetricFlow => "volumetric flow",
            Self::MassConcentration => "mass concentration",
            Self::Length => "length",
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
            Self::Speed => "speed",
            Self::Conductivity => "conductivity",
            Self::Ratio => "ratio",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A multiplicative unit: `value * to_base` is the value in the dimension's
/// base unit.
pub(crate) struct LinearUnit {
    pub symbol: &'static str,
    pub dimension: Dimension,
    pub to_base: f64,
}

const US_GALLON_M3: f64 = 3.785_411_784e-3;
const ACRE_FOOT_M3: f64 = 1_233.481_837_547_52;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub(crate) const LINEAR_UNITS: &[LinearUnit] = &[
    // base m3/s
    unit("m3/s", Dimension::VolumetricFlow, 1.0),
    unit("ft3/s", Dimension::VolumetricFlow, 0.028_316_846_592),
    unit("L/s", Dimension::VolumetricFlow, 1e-3),
    unit("gal/min", Dimension::VolumetricFlow, US_GALLON_M3 / 60.0),
    unit("Mgal/d", Dimension::VolumetricFlow, US_GALLON_M3 * 1e6 / SECONDS_PER_DAY),
    unit("af/d", Dimension::VolumetricFlow, ACRE_FOOT_M3 / SECONDS_PER_DAY),
    // base kg/m3
    unit("kg/m3", Dimension::MassConcentration, 1.0),
    unit("g/L", Dimension::MassConcentration, 1.0),
    unit("mg/L", Dimension::MassConcentration, 1e-3),
    unit("ug/L", Dimension::MassConcentration, 1e-6),
    unit("ng/L", Dimension::MassConcentration, 1e-9),
    unit("mg/m3", Dimension::MassConcentration, 1e-6),
    unit("ug/m3", Dimension::MassConcentration, 1e-9),
    // base m
    unit("m", Dimension::Length, 1.0),
    unit("mm", Dimension::Length, 1e-3),
    unit("cm", Dimension::Length, 1e-2),
    unit("km", Dimension::Length, 1e3),
    unit("in", Dimension::Length, 0.0254),
    unit("ft", Dimension::Length, 0.3048),
    // base Pa
    unit("Pa", Dimension::Pressure, 1.0),
    unit("hPa", Dimension::Pressure, 100.0),
    unit("mbar", Dimension::Pressure, 100.0),
    unit("kPa", Dimension::Pressure, 1_000.0),
    unit("inHg", Dimension::Pressure, 3_386.389),
    unit("atm", Dimension::Pressure, 101_325.0),
    // base m/s
    unit("m/s", Dimension::Speed, 1.0),
    unit("km/h", Dimension::Speed, 1.0 / 3.6),
    unit("mph", Dimension::Speed, 0.447_04),
    unit("kn", Dimension::Speed, 1_852.0 / 3_600.0),
    // base S/m
    unit("uS/cm", Dimension::Conductivity, 1e-4),
    unit("mS/cm", Dimension::Conductivity, 0.1),
    // base 1
    unit("ppm", Dimension::Ratio, 1e-6),
    unit("ppb", Dimension::Ratio, 1e-9),
    unit("%", Dimension::Ratio, 1e-2),
];

const fn unit(symbol: &'static str, dimension: Dimension, to_base: f64) -> LinearUnit {
    LinearUnit {
        symbol,
        dimension,
        to_base,
    }
}

pub(crate) fn linear_unit(symbol: &str) -> Option<&'static LinearUnit> {
    LINEAR_UNITS.iter().find(|unit| unit.symbol == symbol)
}

pub(crate) fn is_temperature(symbol: &str) -> bool {
    matches!(symbol, "degC" | "degF" | "K")
}
