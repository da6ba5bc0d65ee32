#![deny(unsafe_code)]

pub mod curation;
pub mod delta;
pub mod error;
pub mod layer;
pub mod parameter;
pub mod quality;
pub mod rules;
pub mod suggestion;
pub mod variable;

pub use curation::{CurationAction, CurationKind};
pub use delta::{DeltaEntry, DeltaLayer, DeltaStatus, delta_key};
pub use error::{ModelError, Result};
pub use layer::{LayerDocument, MethodRecord, QcFlagRecord, UnitRecord};
pub use parameter::NativeParameter;
pub use quality::QualityReport;
pub use rules::{RuleBook, RulePack};
pub use suggestion::MatchSuggestion;
pub use variable::{CanonicalVariable, DatasetBinding};
