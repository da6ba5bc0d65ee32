//! Score thresholds and qualitative confidence bands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ThresholdError;

/// Default score at or above which a match is accepted automatically.
pub const DEFAULT_AUTO_ACCEPT: f64 = 0.90;
/// Default score at or above which a match is queued for review.
pub const DEFAULT_SUGGEST: f64 = 0.60;

/// Score cutoffs for classifying a best candidate.
///
/// - At or above `auto_accept`: [`Classification::Accept`]
/// - `suggest` to `auto_accept`: [`Classification::Suggest`]
/// - Below `suggest`: [`Classification::Drop`]
///
/// Construction enforces `auto_accept > suggest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    auto_accept: f64,
    suggest: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            auto_accept: DEFAULT_AUTO_ACCEPT,
            suggest: DEFAULT_SUGGEST,
        }
    }
}

impl MatchThresholds {
    pub fn new(auto_accept: f64, suggest: f64) -> Result<Self, ThresholdError> {
        for value in [auto_accept, suggest] {
            if !(0.0..=1.5).contains(&value) {
                return Err(ThresholdError::OutOfRange { value });
            }
        }
        if auto_accept <= suggest {
            return Err(ThresholdError::Inverted {
                auto_accept,
                suggest,
            });
        }
        Ok(Self {
            auto_accept,
            suggest,
        })
    }

    pub fn auto_accept(&self) -> f64 {
        self.auto_accept
    }

    pub fn suggest(&self) -> f64 {
        self.suggest
    }

    #[must_use]
    pub fn classify(&self, score: f64) -> Classification {
        if score >= self.auto_accept {
            Classification::Accept
        } else if score >= self.suggest {
            Classification::Suggest
        } else {
            Classification::Drop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accept,
    Suggest,
    Drop,
}

/// Qualitative confidence band shown to reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    /// Below 0.50.
    Low,
    /// 0.50 to 0.70.
    Medium,
    /// 0.70 to 0.90.
    High,
    /// 0.90 and above.
    VeryHigh,
}

impl ConfidenceBand {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.90 {
            Self::VeryHigh
        } else if score >= 0.70 {
            Self::High
        } else if score >= 0.50 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }

    /// Returns a human-readable description of the band.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very high confidence - safe to promote",
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
