use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A unit string folded to its canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedUnit {
    symbol: String,
    recognized: bool,
}

impl NormalizedUnit {
    pub(crate) fn recognized(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            recognized: true,
        }
    }

    pub(crate) fn passthrough(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            recognized: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.symbol
    }

    /// False when the input was not in any alias table and was kept verbatim.
    pub fn is_recognized(&self) -> bool {
        self.recognized
    }

    pub fn into_string(self) -> String {
        self.symbol
    }
}

impl fmt::Display for NormalizedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Canonical spelling followed by the spellings folded onto it.
///
/// Aliases are written in folded form (see [`fold`]); the canonical spelling
/// is matched through its own folded form.
const ALIASES: &[(&str, &[&str])] = &[
    // volumetric flow
    ("ft3/s", &["cfs", "ft^3/s", "ft3/sec", "cu ft/s", "cubic feet per second", "ft3 s-1"]),
    ("m3/s", &["cms", "m^3/s", "cumecs", "cubic meters per second", "m3 s-1"]),
    ("L/s", &["lps", "liters per second", "litres per second"]),
    ("gal/min", &["gpm", "gallons per minute"]),
    ("Mgal/d", &["mgd", "million gallons per day"]),
    ("af/d", &["acre-ft/d", "ac-ft/d", "acre-feet per day"]),
    // mass concentration
    ("mg/L", &["milligrams per liter", "milligrams per litre", "mg l-1"]),
    ("ug/L", &["micrograms per liter", "micrograms per litre", "ug l-1"]),
    ("ng/L", &["nanograms per liter"]),
    ("g/L", &["grams per liter"]),
    ("kg/m3", &["kg/m^3"]),
    ("mg/m3", &["mg/m^3"]),
    ("ug/m3", &["ug/m^3", "micrograms per cubic meter", "ug m-3"]),
    // length and depth
    ("mm", &["millimeter", "millimeters", "millimetre", "millimetres"]),
    ("cm", &["centimeter", "centimeters"]),
    ("m", &["meter", "meters", "metre", "metres"]),
    ("km", &["kilometer", "kilometers"]),
    ("in", &["inch", "inches"]),
    ("ft", &["foot", "feet"]),
    // temperature
    ("degC", &["c", "deg c", "degrees c", "celsius", "degrees celsius", "deg_c"]),
    ("degF", &["f", "deg f", "degrees f", "fahrenheit", "degrees fahrenheit", "deg_f"]),
    ("K", &["kelvin", "deg k"]),
    // pressure
    ("Pa", &["pascal", "pascals"]),
    ("hPa", &["hectopascal", "hectopascals"]),
    ("kPa", &["kilopascal", "kilopascals"]),
    ("mbar", &["mb", "millibar", "millibars"]),
    ("inHg", &["in hg", "inches of mercury"]),
    ("atm", &["atmosphere", "atmospheres"]),
    // speed
    ("m/s", &["mps", "meters per second", "m s-1"]),
    ("km/h", &["kph", "kmh", "km/hr"]),
    ("mph", &["miles per hour"]),
    ("kn", &["kt", "kts", "knot", "knots"]),
    // specific conductance
    ("uS/cm", &["umho/cm", "microsiemens per centimeter"]),
    ("mS/cm", &["millisiemens per centimeter"]),
    // mixing ratios
    ("ppm", &["parts per million"]),
    ("ppb", &["parts per billion"]),
    ("%", &["percent", "pct"]),
];

static BUILTIN: LazyLock<BTreeMap<String, &'static str>> = LazyLock::new(|| {
    let mut table = BTreeMap::new();
    for (canonical, aliases) in ALIASES {
        table.insert(fold(canonical), *canonical);
        for alias in *aliases {
            table.insert(fold(alias), *canonical);
        }
    }
    table
});

/// Looks up a folded key in the built-in table.
pub(crate) fn builtin(folded: &str) -> Option<&'static str> {
    BUILTIN.get(folded).copied()
}

/// Folds a raw unit string into its lookup key.
///
/// Lower-cases, replaces micro signs and superscripts with ASCII, drops the
/// degree sign and collapses whitespace (including around `/`).
pub(crate) fn fold(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '\u{b5}' | '\u{3bc}' => out.push('u'),
            '\u{b3}' => out.push('3'),
            '\u{b2}' => out.push('2'),
            '\u{b0}' => {}
            '\u{2103}' => out.push('c'),
            '\u{2109}' => out.push('f'),
            _ => out.extend(ch.to_lowercase()),
        }
    }
    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" /", "/").replace("/ ", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold(" \u{b5}g/m\u{b3} "), "ug/m3");
        assert_eq!(fold("\u{b0}C"), "c");
        assert_eq!(fold("ft3 / s"), "ft3/s");
    }

    #[test]
    fn every_canonical_spelling_maps_to_itself() {
        for (canonical, _) in ALIASES {
            assert_eq!(builtin(&fold(canonical)), Some(*canonical), "{canonical}");
        }
    }
}
