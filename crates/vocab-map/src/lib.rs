//! Term broker: proposes canonical variables for native parameters.
//!
//! Scoring is a bounded, explainable heuristic. Each signal adds a fixed
//! amount to a candidate canonical variable and records a reason string:
//!
//! | signal | score | reason |
//! |---|---|---|
//! | rule pack exact map | 0.95 | `exact:<id>` |
//! | rule pack label hint | 0.70 | `label_hint` |
//! | normalized label equality | 0.25 | `label:exact` |
//! | native label contains canonical label | 0.20 | `label:contains` |
//! | canonical label contains native label | 0.10 | `label:contained` |
//! | same unit | 0.03 | `unit:eq` |
//! | convertible unit | 0.02 | `unit:convertible` |
//! | same domain | 0.01 | `domain:eq` |

#![deny(unsafe_code)]

pub mod broker;
pub mod confidence;
pub mod error;
pub mod index;
pub mod normalize;
pub mod score;
pub mod similar;

pub use broker::{MatchOutcome, TermBroker};
pub use confidence::{Classification, ConfidenceBand, MatchThresholds};
pub use error::ThresholdError;
pub use normalize::normalize_label;
pub use score::{CandidateScore, ScoreComponent};
pub use similar::{SimilarLabel, similar_labels};
