//! Error types for matching configuration.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("auto-accept threshold {auto_accept} must be greater than suggest threshold {suggest}")]
    Inverted { auto_accept: f64, suggest: f64 },
    #[error("threshold {value} is outside 0.0..=1.5")]
    OutOfRange { value: f64 },
}
