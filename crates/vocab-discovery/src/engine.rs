//! Discovery engine implementation.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use vocab_map::{MatchOutcome, MatchThresholds, TermBroker};
use vocab_model::{
    DatasetBinding, DeltaEntry, DeltaLayer, DeltaStatus, LayerDocument, MatchSuggestion, NativeParameter,
    RuleBook,
};
use vocab_registry::{CanonicalRegistry, MergedRegistry};

use crate::adapter::{CatalogRecord, SourceAdapter};
use crate::cache::CatalogCache;
use crate::domain::infer_domain;

/// Where a catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Harvest,
    Capabilities,
}

/// Per-run discovery settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryOptions {
    /// Skip the catalog cache and ask the adapter again.
    pub force_refresh: bool,
    pub auto_accept_threshold: f64,
    pub suggest_threshold: f64,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        let thresholds = MatchThresholds::default();
        Self {
            force_refresh: false,
            auto_accept_threshold: thresholds.auto_accept(),
            suggest_threshold: thresholds.suggest(),
        }
    }
}

impl DiscoveryOptions {
    pub fn from_thresholds(thresholds: MatchThresholds) -> Self {
        Self {
            force_refresh: false,
            auto_accept_threshold: thresholds.auto_accept(),
            suggest_threshold: thresholds.suggest(),
        }
    }

    #[must_use]
    pub fn force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

/// Outcome of one discovery run for one source.
///
/// When `errors` is non-empty the counts are zero: nothing from the run was
/// persisted. `warnings` records problems the run recovered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub dataset: String,
    pub catalog_source: Option<CatalogSource>,
    pub from_cache: bool,
    pub catalog_size: usize,
    pub accepted: Vec<MatchSuggestion>,
    pub suggested: Vec<MatchSuggestion>,
    /// Catalog ids that produced neither an accepted nor a suggested match.
    pub failed_matches: Vec<String>,
    /// Matches not written because a curator already decided them.
    pub preserved_decisions: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DiscoveryReport {
    fn new(dataset: &str) -> Self {
        let now = Utc::now();
        Self {
            dataset: dataset.to_string(),
            catalog_source: None,
            from_cache: false,
            catalog_size: 0,
            accepted: Vec::new(),
            suggested: Vec::new(),
            failed_matches: Vec::new(),
            preserved_decisions: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn suggested_count(&self) -> usize {
        self.suggested.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_matches.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pulls source catalogs, matches them and writes the results into the
/// overrides and delta layers.
#[derive(Debug)]
pub struct ServiceDiscoveryEngine {
    registry: Arc<CanonicalRegistry>,
    rules: RuleBook,
    cache: CatalogCache,
}

impl ServiceDiscoveryEngine {
    pub fn new(registry: Arc<CanonicalRegistry>, rules: RuleBook) -> Self {
        Self {
            registry,
            rules,
            cache: CatalogCache::default(),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CatalogCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn registry(&self) -> &Arc<CanonicalRegistry> {
        &self.registry
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Runs discovery for one adapter.
    ///
    /// Never fails: adapter, matching and persistence errors are recorded
    /// in [`DiscoveryReport::errors`].
    pub fn discover(&self, adapter: &dyn SourceAdapter, options: &DiscoveryOptions) -> DiscoveryReport {
        let dataset = adapter.dataset().to_string();
        let mut report = DiscoveryReport::new(&dataset);
        info!(dataset = %dataset, force_refresh = options.force_refresh, "starting discovery");

        if let Err(err) = self.run(adapter, options, &mut report) {
            error!(dataset = %dataset, error = %format!("{err:#}"), "discovery failed");
            report.errors.push(format!("{err:#}"));
            report.accepted.clear();
            report.suggested.clear();
            report.failed_matches.clear();
            report.preserved_decisions = 0;
        } else {
            info!(
                dataset = %dataset,
                catalog = report.catalog_size,
                accepted = report.accepted_count(),
                suggested = report.suggested_count(),
                failed = report.failed_count(),
                preserved = report.preserved_decisions,
                "discovery finished"
            );
        }
        report.finished_at = Utc::now();
        report
    }

    fn run(
        &self,
        adapter: &dyn SourceAdapter,
        options: &DiscoveryOptions,
        report: &mut DiscoveryReport,
    ) -> anyhow::Result<()> {
        let thresholds =
            MatchThresholds::new(options.auto_accept_threshold, options.suggest_threshold)
                .context("invalid discovery thresholds")?;
        let dataset = report.dataset.clone();

        let records = self.catalog(adapter, options.force_refresh, report)?;
        report.catalog_size = records.len();

        let fallback_domain = infer_domain(&dataset);
        let parameters: Vec<NativeParameter> = records
            .iter()
            .filter(|record| !record.id.trim().is_empty())
            .map(|record| record.to_parameter(&dataset, fallback_domain))
            .collect();

        let merged = self.registry.merged();
        let broker = TermBroker::new(self.rules.clone()).with_thresholds(thresholds);
        let outcome = broker.match_parameters(&dataset, &parameters, &merged);

        let now = Utc::now();
        report.preserved_decisions = self
            .registry
            .update_curation(|overrides, delta| {
                persist(overrides, delta, &merged, &outcome, &parameters, now)
            })
            .with_context(|| format!("failed to persist discovery results for {dataset}"))?;

        report.failed_matches = failed_matches(&parameters, &outcome);
        report.accepted = outcome.accepted;
        report.suggested = outcome.suggested;
        Ok(())
    }

    fn catalog(
        &self,
        adapter: &dyn SourceAdapter,
        force_refresh: bool,
        report: &mut DiscoveryReport,
    ) -> anyhow::Result<Vec<CatalogRecord>> {
        let dataset = adapter.dataset();
        if force_refresh {
            self.cache.invalidate(dataset);
        } else if let Some((source, records)) = self.cache.get(dataset) {
            debug!(dataset, records = records.len(), "using cached catalog");
            report.catalog_source = Some(source);
            report.from_cache = true;
            return Ok(records);
        }

        let (source, records) = match adapter.harvest() {
            Ok(Some(records)) => (CatalogSource::Harvest, records),
            Ok(None) => capabilities(adapter)?,
            Err(err) => {
                warn!(
                    dataset,
                    error = %format!("{err:#}"),
                    "harvest failed, falling back to capabilities"
                );
                report.warnings.push(format!("harvest failed: {err:#}"));
                capabilities(adapter)?
            }
        };
        self.cache.insert(dataset, source, records.clone());
        report.catalog_source = Some(source);
        Ok(records)
    }
}

fn capabilities(adapter: &dyn SourceAdapter) -> anyhow::Result<(CatalogSource, Vec<CatalogRecord>)> {
    let capabilities = adapter
        .capabilities()
        .with_context(|| format!("capabilities call failed for {}", adapter.dataset()))?;
    Ok((CatalogSource::Capabilities, capabilities.into_records()))
}

/// Writes accepted matches to overrides and suggested ones to the delta
/// layer. Returns how many were skipped because a curator already decided
/// them.
fn persist(
    overrides: &mut LayerDocument,
    delta: &mut DeltaLayer,
    merged: &MergedRegistry,
    outcome: &MatchOutcome,
    parameters: &[NativeParameter],
    now: DateTime<Utc>,
) -> usize {
    let mut preserved = 0;

    for suggestion in &outcome.accepted {
        if curated_binding(overrides, &suggestion.dataset, &suggestion.native_id)
            || curated_target(overrides, &suggestion.canonical, &suggestion.dataset)
        {
            debug!(key = %suggestion.key(), "keeping curated binding");
            preserved += 1;
            continue;
        }
        if let Some(existing) = delta.get(&suggestion.dataset, &suggestion.native_id)
            && human_decision(existing)
        {
            debug!(key = %suggestion.key(), status = existing.status.as_str(), "keeping decided entry");
            preserved += 1;
            continue;
        }
        let Some(mut record) = overrides
            .variables
            .get(&suggestion.canonical)
            .or_else(|| merged.variable(&suggestion.canonical))
            .cloned()
        else {
            warn!(canonical = %suggestion.canonical, "accepted canonical vanished from registry");
            continue;
        };
        record.datasets.insert(
            suggestion.dataset.clone(),
            DatasetBinding {
                native: suggestion.native_id.clone(),
                confidence: Some(suggestion.score),
                reasons: suggestion.reasons.clone(),
                auto_accepted: true,
                accepted_at: Some(now),
                ..DatasetBinding::default()
            },
        );
        overrides.insert_variable(record);
        // A pending entry for the same key is settled by the auto-accept.
        if let Some(existing) = delta.get_mut(&suggestion.dataset, &suggestion.native_id) {
            existing.status = DeltaStatus::Accepted;
            existing.accepted_at = Some(now);
            existing.accepted_canonical = Some(suggestion.canonical.clone());
            existing.confidence = suggestion.score;
            existing.reasons = suggestion.reasons.clone();
            existing.updated_at = Some(now);
        }
    }

    for suggestion in &outcome.suggested {
        let domain = parameters
            .iter()
            .find(|parameter| parameter.id == suggestion.native_id)
            .and_then(|parameter| parameter.domain.clone());
        match delta.get_mut(&suggestion.dataset, &suggestion.native_id) {
            Some(existing) if existing.is_decided() => {
                debug!(key = %suggestion.key(), status = existing.status.as_str(), "keeping decided entry");
                preserved += 1;
            }
            Some(existing) => {
                existing.suggested_canonical = suggestion.canonical.clone();
                existing.confidence = suggestion.score;
                existing.reasons = suggestion.reasons.clone();
                existing.native_label = suggestion.native_label.clone();
                existing.native_unit = suggestion.native_unit.clone();
                existing.domain = domain;
                existing.updated_at = Some(now);
            }
            None => {
                if let Err(err) = delta.try_insert(DeltaEntry::pending(suggestion, domain, now)) {
                    warn!(key = %suggestion.key(), error = %err, "suggestion not queued");
                }
            }
        }
    }

    preserved
}

fn curated_binding(overrides: &LayerDocument, dataset: &str, native_id: &str) -> bool {
    overrides.variables.values().any(|variable| {
        variable
            .binding(dataset)
            .is_some_and(|binding| binding.native == native_id && binding.is_curated())
    })
}

/// True when `canonical` already carries a curated binding for `dataset`,
/// whatever native id it points at.
fn curated_target(overrides: &LayerDocument, canonical: &str, dataset: &str) -> bool {
    overrides
        .variables
        .get(canonical)
        .and_then(|variable| variable.binding(dataset))
        .is_some_and(DatasetBinding::is_curated)
}

/// Rejections, and acceptances carrying a curator. Entries settled by an
/// earlier auto-accept may be refreshed.
fn human_decision(entry: &DeltaEntry) -> bool {
    entry.status == DeltaStatus::Rejected
        || (entry.status == DeltaStatus::Accepted && entry.curator.is_some())
}

fn failed_matches(parameters: &[NativeParameter], outcome: &MatchOutcome) -> Vec<String> {
    let matched: BTreeSet<&str> = outcome
        .accepted
        .iter()
        .chain(&outcome.suggested)
        .map(|suggestion| suggestion.native_id.as_str())
        .collect();
    let mut seen = BTreeSet::new();
    parameters
        .iter()
        .map(|parameter| parameter.id.as_str())
        .filter(|id| !matched.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect()
}
