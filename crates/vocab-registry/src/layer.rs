use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Seed,
    Harvest,
    Overrides,
    Delta,
}

impl LayerKind {
    pub const ALL: [Self; 4] = [Self::Seed, Self::Harvest, Self::Overrides, Self::Delta];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Harvest => "harvest",
            Self::Overrides => "overrides",
            Self::Delta => "delta",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File names of the four layers inside a registry directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerFiles {
    pub seed: String,
    pub harvest: String,
    pub overrides: String,
    pub delta: String,
}

impl Default for LayerFiles {
    fn default() -> Self {
        Self {
            seed: "seed.json".to_string(),
            harvest: "harvest.json".to_string(),
            overrides: "overrides.json".to_string(),
            delta: "delta.json".to_string(),
        }
    }
}

impl LayerFiles {
    pub fn file_name(&self, kind: LayerKind) -> &str {
        match kind {
            LayerKind::Seed => &self.seed,
            LayerKind::Harvest => &self.harvest,
            LayerKind::Overrides => &self.overrides,
            LayerKind::Delta => &self.delta,
        }
    }
}
