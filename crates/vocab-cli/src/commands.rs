//! Command implementations. Each returns data; printing lives in the binary.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use vocab_curate::{BatchOutcome, RegistryCurator, ReviewFilter, ReviewItem, VocabConfig};
use vocab_map::{SimilarLabel, similar_labels};
use vocab_model::{CanonicalVariable, CurationAction, QualityReport};
use vocab_registry::CanonicalRegistry;
use vocab_units::{Dimension, normalize_unit};

/// Configuration plus the registry it points at.
#[derive(Debug)]
pub struct Session {
    pub config: VocabConfig,
    pub registry: Arc<CanonicalRegistry>,
}

/// Global options that shape a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config_path: Option<PathBuf>,
    pub registry_dir: Option<PathBuf>,
    pub curator: Option<String>,
}

impl Session {
    pub fn open(options: &SessionOptions) -> Result<Self> {
        let mut config = VocabConfig::load_or_default(options.config_path.as_deref())
            .context("load configuration")?;
        if let Some(dir) = &options.registry_dir {
            config.registry.dir.clone_from(dir);
        }
        if let Some(curator) = &options.curator {
            config.curation.curator.clone_from(curator);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: VocabConfig) -> Result<Self> {
        config.validate().context("validate configuration")?;
        let registry = config
            .open_registry()
            .with_context(|| format!("open registry at {}", config.registry.dir.display()))?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }

    pub fn curator(&self) -> RegistryCurator {
        let curator = RegistryCurator::new(
            Arc::clone(&self.registry),
            self.config.curation.curator.clone(),
        );
        match &self.config.curation.audit_log {
            Some(path) => curator.with_audit_log(path),
            None => curator,
        }
    }
}

pub fn run_review(session: &Session, filter: &ReviewFilter) -> Vec<ReviewItem> {
    session.curator().review_pending_suggestions(filter)
}

pub fn run_accept(
    session: &Session,
    dataset: &str,
    native_id: &str,
    canonical: Option<&str>,
    modifications: BTreeMap<String, String>,
) -> Result<CurationAction> {
    let mut curator = session.curator();
    let modifications = (!modifications.is_empty()).then_some(modifications);
    if !curator.accept_suggestion(dataset, native_id, canonical, modifications) {
        bail!("could not accept {dataset}:{native_id} (see log for the reason)");
    }
    last_action(&curator)
}

pub fn run_reject(session: &Session, dataset: &str, native_id: &str, reason: &str) -> Result<CurationAction> {
    let mut curator = session.curator();
    if !curator.reject_suggestion(dataset, native_id, reason) {
        bail!("could not reject {dataset}:{native_id} (see log for the reason)");
    }
    last_action(&curator)
}

pub fn run_defer(session: &Session, dataset: &str, native_id: &str, reason: &str) -> Result<CurationAction> {
    let mut curator = session.curator();
    if !curator.defer_suggestion(dataset, native_id, reason) {
        bail!("could not defer {dataset}:{native_id} (see log for the reason)");
    }
    last_action(&curator)
}

pub fn run_create(session: &Session, variable: CanonicalVariable) -> Result<()> {
    let id = variable.id.clone();
    if !session.curator().create_new_canonical_variable(variable) {
        bail!("could not create canonical variable '{id}' (see log for the reason)");
    }
    Ok(())
}

/// Uses the configured nightly threshold when `threshold` is `None`.
pub fn run_batch(session: &Session, threshold: Option<f64>, dry_run: bool) -> Result<BatchOutcome> {
    let threshold = threshold.unwrap_or(session.config.curation.nightly_threshold);
    if !(0.0..=1.5).contains(&threshold) {
        bail!("threshold {threshold} is outside 0.0..=1.5");
    }
    Ok(session
        .curator()
        .batch_process_high_confidence(threshold, dry_run))
}

pub fn run_report(session: &Session) -> QualityReport {
    session.curator().generate_quality_report()
}

/// Merged variables, optionally restricted to a domain.
pub fn run_variables(session: &Session, domain: Option<&str>) -> Vec<CanonicalVariable> {
    let merged = session.registry.merged();
    merged
        .variables
        .into_values()
        .filter(|variable| {
            domain.is_none_or(|wanted| {
                variable
                    .domain
                    .as_deref()
                    .is_some_and(|domain| domain.eq_ignore_ascii_case(wanted))
            })
        })
        .collect()
}

pub fn run_search(session: &Session, query: &str, limit: usize) -> Vec<SimilarLabel> {
    similar_labels(query, &session.registry.merged(), limit)
}

/// Result of a unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: f64,
    pub from: String,
    pub to: String,
    pub converted: f64,
    pub dimension: Option<Dimension>,
}

pub fn run_convert(value: f64, from: &str, to: &str) -> Result<Conversion> {
    let from_unit = normalize_unit(from).with_context(|| format!("blank source unit '{from}'"))?;
    let to_unit = normalize_unit(to).with_context(|| format!("blank target unit '{to}'"))?;
    let converted = vocab_units::convert(value, from, to)
        .with_context(|| format!("cannot convert {from_unit} to {to_unit}"))?;
    info!(value, from = %from_unit, to = %to_unit, converted, "converted value");
    Ok(Conversion {
        value,
        dimension: vocab_units::dimension_of(from_unit.as_str()),
        from: from_unit.into_string(),
        to: to_unit.into_string(),
        converted,
    })
}

/// Parses `KEY=VALUE` pairs.
pub fn parse_modifications(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("expected KEY=VALUE, got '{pair}'"))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("empty key in '{pair}'");
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn last_action(curator: &RegistryCurator) -> Result<CurationAction> {
    curator
        .actions()
        .last()
        .cloned()
        .context("decision was not recorded")
}
