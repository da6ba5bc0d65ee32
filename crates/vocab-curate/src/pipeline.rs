//! Scheduled discovery plus curation.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use vocab_discovery::{
    CatalogCache, DiscoveryOptions, DiscoveryReport, ServiceDiscoveryEngine, SourceAdapter,
};
use vocab_model::{QualityReport, RuleBook};
use vocab_registry::{JsonFileStore, LayerKind, LayerStore};

use crate::config::VocabConfig;
use crate::curator::{BatchOutcome, RegistryCurator};
use crate::error::{CurationError, Result};

/// Default confidence promoted by the nightly run.
pub const NIGHTLY_THRESHOLD: f64 = 0.95;

/// Sums over every source's discovery report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryTotals {
    pub sources: usize,
    pub failed_sources: usize,
    pub catalog_entries: usize,
    pub accepted: usize,
    pub suggested: usize,
    pub failed_matches: usize,
}

impl DiscoveryTotals {
    pub fn from_reports(reports: &[DiscoveryReport]) -> Self {
        reports.iter().fold(Self::default(), |mut totals, report| {
            totals.sources += 1;
            if !report.is_success() {
                totals.failed_sources += 1;
            }
            totals.catalog_entries += report.catalog_size;
            totals.accepted += report.accepted_count();
            totals.suggested += report.suggested_count();
            totals.failed_matches += report.failed_count();
            totals
        })
    }
}

/// Result of [`AutoCurationPipeline::run_nightly_curation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NightlySummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<DiscoveryReport>,
    pub totals: DiscoveryTotals,
    pub quality: QualityReport,
    /// 0-100 registry quality score.
    pub quality_score: f64,
    pub batch: BatchOutcome,
    pub overrides_fingerprint_before: Option<String>,
    pub overrides_fingerprint_after: Option<String>,
}

impl NightlySummary {
    /// True when the run changed the overrides layer.
    pub fn overrides_changed(&self) -> bool {
        self.overrides_fingerprint_before != self.overrides_fingerprint_after
    }

    /// Persists the summary as pretty JSON.
    pub fn write_summary(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| CurationError::Json {
            what: "nightly summary",
            source,
        })?;
        JsonFileStore::new(path).write(&json)?;
        info!(path = %path.display(), "wrote nightly summary");
        Ok(())
    }
}

/// Discovery across many sources followed by automatic promotion of very
/// high confidence suggestions.
#[derive(Debug)]
pub struct AutoCurationPipeline {
    engine: ServiceDiscoveryEngine,
    curator: RegistryCurator,
    options: DiscoveryOptions,
    nightly_threshold: f64,
}

impl AutoCurationPipeline {
    pub fn new(engine: ServiceDiscoveryEngine, curator: RegistryCurator) -> Self {
        Self {
            engine,
            curator,
            options: DiscoveryOptions::default(),
            nightly_threshold: NIGHTLY_THRESHOLD,
        }
    }

    /// Opens the configured registry and wires the engine and curator to it.
    pub fn from_config(config: &VocabConfig, rules: RuleBook) -> Result<Self> {
        config.validate()?;
        let thresholds = config.matching.thresholds()?;
        let registry = Arc::new(config.open_registry()?);
        let engine = ServiceDiscoveryEngine::new(Arc::clone(&registry), rules)
            .with_cache(CatalogCache::new(config.discovery.cache_ttl()));
        let mut curator = RegistryCurator::new(registry, config.curation.curator.clone());
        if let Some(path) = &config.curation.audit_log {
            curator = curator.with_audit_log(path);
        }
        Ok(Self::new(engine, curator)
            .with_options(DiscoveryOptions::from_thresholds(thresholds))
            .with_nightly_threshold(config.curation.nightly_threshold))
    }

    #[must_use]
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_nightly_threshold(mut self, threshold: f64) -> Self {
        self.nightly_threshold = threshold;
        self
    }

    pub fn engine(&self) -> &ServiceDiscoveryEngine {
        &self.engine
    }

    pub fn curator(&self) -> &RegistryCurator {
        &self.curator
    }

    pub fn curator_mut(&mut self) -> &mut RegistryCurator {
        &mut self.curator
    }

    /// Runs discovery for every source. A failing source yields a report
    /// with errors and does not stop the others.
    pub fn run_discovery_pipeline(&self, sources: &[Box<dyn SourceAdapter>]) -> Vec<DiscoveryReport> {
        let reports: Vec<DiscoveryReport> = sources
            .iter()
            .map(|source| {
                let report = self.engine.discover(source.as_ref(), &self.options);
                if !report.is_success() {
                    warn!(dataset = %report.dataset, errors = ?report.errors, "source failed");
                }
                report
            })
            .collect();
        let totals = DiscoveryTotals::from_reports(&reports);
        info!(
            sources = totals.sources,
            failed_sources = totals.failed_sources,
            accepted = totals.accepted,
            suggested = totals.suggested,
            "discovery pipeline finished"
        );
        reports
    }

    /// Discovery, then a quality report, then batch promotion at the
    /// nightly threshold.
    pub fn run_nightly_curation(&mut self, sources: &[Box<dyn SourceAdapter>]) -> NightlySummary {
        let started_at = Utc::now();
        let registry = Arc::clone(self.engine.registry());
        let overrides_fingerprint_before = overrides_fingerprint(&registry);

        let reports = self.run_discovery_pipeline(sources);
        let quality = self.curator.generate_quality_report();
        let batch = self
            .curator
            .batch_process_high_confidence(self.nightly_threshold, false);

        let summary = NightlySummary {
            started_at,
            finished_at: Utc::now(),
            totals: DiscoveryTotals::from_reports(&reports),
            reports,
            quality_score: quality.quality_score(),
            quality,
            batch,
            overrides_fingerprint_before,
            overrides_fingerprint_after: overrides_fingerprint(&registry),
        };
        info!(
            quality_score = summary.quality_score,
            promoted = summary.batch.accepted,
            overrides_changed = summary.overrides_changed(),
            "nightly curation finished"
        );
        summary
    }
}

fn overrides_fingerprint(registry: &vocab_registry::CanonicalRegistry) -> Option<String> {
    registry
        .fingerprint(LayerKind::Overrides)
        .unwrap_or_else(|err| {
            warn!(error = %err, "cannot fingerprint overrides layer");
            None
        })
}
