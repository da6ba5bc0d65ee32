//! Review workflow over the pending-suggestion layer.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use vocab_map::{ConfidenceBand, SimilarLabel, similar_labels};
use vocab_model::{
    CanonicalVariable, CurationAction, CurationKind, DatasetBinding, DeltaEntry, DeltaLayer,
    DeltaStatus, LayerDocument, QualityReport,
};
use vocab_registry::{CanonicalRegistry, JsonFileStore, LayerStore, MergedRegistry};

use crate::error::{CurationError, Result};

/// Share of variables without a URI above which a recommendation is made.
const MISSING_URI_RATIO: f64 = 0.30;
const MISSING_UNIT_RATIO: f64 = 0.20;
const PENDING_BACKLOG: usize = 50;
const RELATED_LIMIT: usize = 10;
const ALTERNATIVE_LIMIT: usize = 3;

/// Constraints for [`RegistryCurator::review_pending_suggestions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub limit: Option<usize>,
    pub min_confidence: f64,
    /// Matches the entry's domain, or the suggested canonical's domain
    /// when the entry has none.
    pub domain: Option<String>,
}

/// A pending suggestion prepared for a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub key: String,
    pub entry: DeltaEntry,
    pub band: ConfidenceBand,
    pub canonical_label: Option<String>,
    pub domain: Option<String>,
    /// Other canonical ids sharing the suggestion's domain.
    pub related: Vec<String>,
    /// Canonical variables with labels resembling the native label.
    pub alternatives: Vec<SimilarLabel>,
}

/// Counts from [`RegistryCurator::batch_process_high_confidence`].
///
/// In a dry run `accepted` counts the entries that would have been accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub dry_run: bool,
    pub threshold: f64,
    pub accepted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub keys: Vec<String>,
}

/// Why a curation request was refused.
#[derive(Debug)]
enum Refusal {
    MissingEntry,
    NoCanonical,
    UnknownCanonical(String),
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry => f.write_str("no delta entry for key"),
            Self::NoCanonical => f.write_str("no canonical id to accept into"),
            Self::UnknownCanonical(id) => write!(f, "canonical '{id}' is not in the registry"),
        }
    }
}

/// Human-facing curation over a shared registry.
///
/// Every decision is appended to an in-memory audit trail and, when
/// configured, to a JSON-lines audit log.
#[derive(Debug)]
pub struct RegistryCurator {
    registry: Arc<CanonicalRegistry>,
    curator: String,
    audit_log: Option<PathBuf>,
    actions: Vec<CurationAction>,
}

impl RegistryCurator {
    pub fn new(registry: Arc<CanonicalRegistry>, curator: impl Into<String>) -> Self {
        Self {
            registry,
            curator: curator.into(),
            audit_log: None,
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log = Some(path.into());
        self
    }

    pub fn curator(&self) -> &str {
        &self.curator
    }

    pub fn registry(&self) -> &Arc<CanonicalRegistry> {
        &self.registry
    }

    /// Audit trail of this session, oldest first.
    pub fn actions(&self) -> &[CurationAction] {
        &self.actions
    }

    /// Pending suggestions meeting `filter`, highest confidence first.
    pub fn review_pending_suggestions(&self, filter: &ReviewFilter) -> Vec<ReviewItem> {
        let merged = self.registry.merged();
        let delta = self.registry.get_delta();
        let wanted_domain = filter.domain.as_deref().map(str::trim);

        let mut items: Vec<ReviewItem> = delta
            .pending()
            .filter(|entry| entry.confidence >= filter.min_confidence)
            .filter_map(|entry| {
                let canonical = merged.variable(&entry.suggested_canonical);
                let domain = entry
                    .domain
                    .clone()
                    .or_else(|| canonical.and_then(|variable| variable.domain.clone()));
                if let Some(wanted) = wanted_domain
                    && !domain
                        .as_deref()
                        .is_some_and(|domain| domain.eq_ignore_ascii_case(wanted))
                {
                    return None;
                }
                Some(review_item(entry, canonical, domain, &merged))
            })
            .collect();

        items.sort_by(|a, b| {
            b.entry
                .confidence
                .partial_cmp(&a.entry.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(limit) = filter.limit {
            items.truncate(limit);
        }
        debug!(count = items.len(), "prepared review queue");
        items
    }

    /// Promotes a pending suggestion into the overrides layer.
    ///
    /// `canonical` redirects the binding to a different canonical variable;
    /// the target must already exist in the merged registry. Returns `false`
    /// (and writes nothing) when the delta entry is missing or the target
    /// cannot be resolved.
    pub fn accept_suggestion(
        &mut self,
        dataset: &str,
        native_id: &str,
        canonical: Option<&str>,
        modifications: Option<BTreeMap<String, String>>,
    ) -> bool {
        let merged = self.registry.merged();
        let now = Utc::now();
        let curator = self.curator.clone();
        let modifications = modifications.unwrap_or_default();

        let result = self.registry.update_curation(|overrides, delta| {
            promote(
                overrides,
                delta,
                &merged,
                Promotion {
                    dataset,
                    native_id,
                    canonical,
                    modifications: &modifications,
                    curator: &curator,
                    now,
                },
            )
        });
        match result {
            Ok(Ok(action)) => {
                info!(
                    dataset,
                    native_id,
                    canonical = action.canonical.as_deref().unwrap_or_default(),
                    action = action.action.as_str(),
                    "accepted suggestion"
                );
                self.record(action);
                true
            }
            Ok(Err(refusal)) => {
                warn!(dataset, native_id, reason = %refusal, "cannot accept suggestion");
                false
            }
            Err(err) => {
                error!(dataset, native_id, error = %err, "failed to accept suggestion");
                false
            }
        }
    }

    /// Marks a suggestion rejected. Overrides are not touched.
    pub fn reject_suggestion(&mut self, dataset: &str, native_id: &str, reason: &str) -> bool {
        let now = Utc::now();
        let curator = self.curator.clone();
        let result = self.registry.update_delta(|delta| {
            let entry = delta.get_mut(dataset, native_id)?;
            entry.status = DeltaStatus::Rejected;
            entry.rejected_at = Some(now);
            entry.rejection_reason = Some(reason.to_string());
            entry.curator = Some(curator.clone());
            entry.updated_at = Some(now);
            Some(decision(entry, CurationKind::Reject, Some(reason), &curator, now))
        });
        self.finish_decision(dataset, native_id, "reject", result)
    }

    /// Postpones a decision. The entry stays pending.
    pub fn defer_suggestion(&mut self, dataset: &str, native_id: &str, reason: &str) -> bool {
        let now = Utc::now();
        let curator = self.curator.clone();
        let result = self.registry.update_delta(|delta| {
            let entry = delta.get_mut(dataset, native_id)?;
            entry.deferred_at = Some(now);
            entry.defer_reason = Some(reason.to_string());
            entry.curator = Some(curator.clone());
            entry.updated_at = Some(now);
            Some(decision(entry, CurationKind::Defer, Some(reason), &curator, now))
        });
        self.finish_decision(dataset, native_id, "defer", result)
    }

    /// Adds a new variable to the seed layer. Fails when the id is blank or
    /// already present in seed.
    pub fn create_new_canonical_variable(&mut self, mut variable: CanonicalVariable) -> bool {
        if variable.id.trim().is_empty() || variable.label.trim().is_empty() {
            warn!(id = %variable.id, "canonical variable needs an id and a label");
            return false;
        }
        let id = variable.id.clone();
        variable.datasets.clear();

        let result = self.registry.update_seed(|seed| {
            if seed.variables.contains_key(&id) {
                return false;
            }
            seed.insert_variable(variable);
            true
        });
        match result {
            Ok(true) => {
                info!(id = %id, curator = %self.curator, "created canonical variable");
                true
            }
            Ok(false) => {
                warn!(id = %id, "canonical variable already exists in seed");
                false
            }
            Err(err) => {
                error!(id = %id, error = %err, "failed to create canonical variable");
                false
            }
        }
    }

    /// Accepts every pending suggestion at or above `threshold`.
    pub fn batch_process_high_confidence(&mut self, threshold: f64, dry_run: bool) -> BatchOutcome {
        let delta = self.registry.get_delta();
        let mut outcome = BatchOutcome {
            dry_run,
            threshold,
            ..BatchOutcome::default()
        };

        for entry in delta.pending() {
            if entry.confidence < threshold {
                outcome.skipped += 1;
                continue;
            }
            if dry_run {
                info!(
                    key = %entry.key(),
                    canonical = %entry.suggested_canonical,
                    confidence = entry.confidence,
                    "would accept"
                );
                outcome.accepted += 1;
                outcome.keys.push(entry.key());
            } else if self.accept_suggestion(&entry.dataset, &entry.native_id, None, None) {
                outcome.accepted += 1;
                outcome.keys.push(entry.key());
            } else {
                outcome.errors += 1;
            }
        }

        info!(
            threshold,
            dry_run,
            accepted = outcome.accepted,
            skipped = outcome.skipped,
            errors = outcome.errors,
            "batch promotion finished"
        );
        outcome
    }

    /// Completeness counts over the merged registry with recommendations.
    pub fn generate_quality_report(&self) -> QualityReport {
        let merged = self.registry.merged();
        let pending = self.registry.get_delta().pending_count();
        quality_report(&merged, pending, Utc::now())
    }

    /// Writes the session's audit trail as a JSON array.
    pub fn export_actions(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.actions).map_err(|source| {
            CurationError::Json {
                what: "curation actions",
                source,
            }
        })?;
        JsonFileStore::new(path).write(&json)?;
        info!(path = %path.display(), actions = self.actions.len(), "exported curation actions");
        Ok(())
    }

    fn finish_decision(
        &mut self,
        dataset: &str,
        native_id: &str,
        what: &'static str,
        result: vocab_registry::Result<Option<CurationAction>>,
    ) -> bool {
        match result {
            Ok(Some(action)) => {
                info!(dataset, native_id, action = what, "recorded decision");
                self.record(action);
                true
            }
            Ok(None) => {
                warn!(dataset, native_id, action = what, "no delta entry for key");
                false
            }
            Err(err) => {
                error!(dataset, native_id, action = what, error = %err, "failed to record decision");
                false
            }
        }
    }

    fn record(&mut self, action: CurationAction) {
        if let Some(path) = &self.audit_log
            && let Err(err) = append_json_line(path, &action)
        {
            warn!(path = %path.display(), error = %err, "failed to append audit log");
        }
        self.actions.push(action);
    }
}

struct Promotion<'a> {
    dataset: &'a str,
    native_id: &'a str,
    canonical: Option<&'a str>,
    modifications: &'a BTreeMap<String, String>,
    curator: &'a str,
    now: DateTime<Utc>,
}

fn promote(
    overrides: &mut LayerDocument,
    delta: &mut DeltaLayer,
    merged: &MergedRegistry,
    request: Promotion<'_>,
) -> std::result::Result<CurationAction, Refusal> {
    let Promotion {
        dataset,
        native_id,
        canonical,
        modifications,
        curator,
        now,
    } = request;
    let entry = delta
        .get_mut(dataset, native_id)
        .ok_or(Refusal::MissingEntry)?;
    let target = canonical
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(entry.suggested_canonical.trim())
        .to_string();
    if target.is_empty() {
        return Err(Refusal::NoCanonical);
    }
    let mut record = overrides
        .variables
        .get(&target)
        .or_else(|| merged.variable(&target))
        .cloned()
        .ok_or_else(|| Refusal::UnknownCanonical(target.clone()))?;

    // A native parameter is bound to one canonical variable per dataset.
    for (id, variable) in &mut overrides.variables {
        if *id != target
            && variable
                .binding(dataset)
                .is_some_and(|binding| binding.native == native_id)
        {
            variable.datasets.remove(dataset);
        }
    }

    record.datasets.insert(
        dataset.to_string(),
        DatasetBinding {
            native: native_id.to_string(),
            confidence: Some(entry.confidence),
            reasons: entry.reasons.clone(),
            auto_accepted: false,
            curator: Some(curator.to_string()),
            accepted_at: Some(now),
            modifications: modifications.clone(),
        },
    );
    overrides.insert_variable(record);

    entry.status = DeltaStatus::Accepted;
    entry.accepted_at = Some(now);
    entry.accepted_canonical = Some(target.clone());
    entry.curator = Some(curator.to_string());
    entry.updated_at = Some(now);

    let kind = if target != entry.suggested_canonical || !modifications.is_empty() {
        CurationKind::Modify
    } else {
        CurationKind::Accept
    };
    Ok(CurationAction {
        action: kind,
        dataset: dataset.to_string(),
        native_id: native_id.to_string(),
        canonical: Some(target),
        reason: None,
        curator: curator.to_string(),
        timestamp: now,
        confidence: Some(entry.confidence),
        modifications: modifications.clone(),
    })
}

fn decision(
    entry: &DeltaEntry,
    kind: CurationKind,
    reason: Option<&str>,
    curator: &str,
    now: DateTime<Utc>,
) -> CurationAction {
    CurationAction {
        action: kind,
        dataset: entry.dataset.clone(),
        native_id: entry.native_id.clone(),
        canonical: Some(entry.suggested_canonical.clone()),
        reason: reason.map(str::to_string),
        curator: curator.to_string(),
        timestamp: now,
        confidence: Some(entry.confidence),
        modifications: BTreeMap::new(),
    }
}

fn review_item(
    entry: &DeltaEntry,
    canonical: Option<&CanonicalVariable>,
    domain: Option<String>,
    merged: &MergedRegistry,
) -> ReviewItem {
    let related = domain
        .as_deref()
        .map(|domain| {
            merged
                .variables_in_domain(domain)
                .map(|variable| variable.id.clone())
                .filter(|id| *id != entry.suggested_canonical)
                .take(RELATED_LIMIT)
                .collect()
        })
        .unwrap_or_default();
    let query = entry.native_label.as_deref().unwrap_or(&entry.native_id);
    let alternatives = similar_labels(query, merged, ALTERNATIVE_LIMIT + 1)
        .into_iter()
        .filter(|similar| similar.canonical != entry.suggested_canonical)
        .take(ALTERNATIVE_LIMIT)
        .collect();
    ReviewItem {
        key: entry.key(),
        entry: entry.clone(),
        band: ConfidenceBand::from_score(entry.confidence),
        canonical_label: canonical.map(|variable| variable.label.clone()),
        domain,
        related,
        alternatives,
    }
}

/// Builds the quality report for a merged registry.
pub fn quality_report(merged: &MergedRegistry, pending: usize, now: DateTime<Utc>) -> QualityReport {
    let mut report = QualityReport {
        generated_at: now,
        total_variables: merged.len(),
        missing_uris: 0,
        missing_units: 0,
        coverage_by_domain: BTreeMap::new(),
        unassigned_domain: 0,
        pending_suggestions: pending,
        recommendations: Vec::new(),
    };
    for variable in merged.variables.values() {
        if !variable.has_property_uri() {
            report.missing_uris += 1;
        }
        if !variable.has_preferred_unit() {
            report.missing_units += 1;
        }
        match variable.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => {
                *report.coverage_by_domain.entry(domain.to_string()).or_insert(0) += 1;
            }
            _ => report.unassigned_domain += 1,
        }
    }
    report.recommendations = recommendations(&report);
    report
}

fn recommendations(report: &QualityReport) -> Vec<String> {
    let mut out = Vec::new();
    let total = report.total_variables;
    if total == 0 {
        out.push("Registry is empty; seed it with canonical variables".to_string());
    } else {
        let uri_ratio = report.missing_uris as f64 / total as f64;
        if uri_ratio > MISSING_URI_RATIO {
            out.push(format!(
                "{} of {total} variables ({:.0}%) lack an observed property URI; link them to an ontology",
                report.missing_uris,
                uri_ratio * 100.0
            ));
        }
        let unit_ratio = report.missing_units as f64 / total as f64;
        if unit_ratio > MISSING_UNIT_RATIO {
            out.push(format!(
                "{} of {total} variables ({:.0}%) have no preferred unit",
                report.missing_units,
                unit_ratio * 100.0
            ));
        }
    }
    let thin: BTreeSet<&str> = report
        .coverage_by_domain
        .iter()
        .filter(|(_, count)| **count == 1)
        .map(|(domain, _)| domain.as_str())
        .collect();
    for domain in thin {
        out.push(format!("Domain '{domain}' has a single variable; expand its coverage"));
    }
    if report.pending_suggestions > PENDING_BACKLOG {
        out.push(format!(
            "{} suggestions await review; run a batch promotion or work the review queue",
            report.pending_suggestions
        ));
    }
    out
}

fn append_json_line(path: &Path, action: &CurationAction) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(action).map_err(std::io::Error::other)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_of(variables: Vec<CanonicalVariable>) -> MergedRegistry {
        let mut merged = MergedRegistry::default();
        for variable in variables {
            merged.variables.insert(variable.id.clone(), variable);
        }
        merged
    }

    #[test]
    fn empty_registry_scores_zero() {
        let report = quality_report(&MergedRegistry::default(), 0, Utc::now());
        assert_eq!(report.total_variables, 0);
        assert_eq!(report.quality_score(), 0.0);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn counts_and_recommendations() {
        let merged = registry_of(vec![
            CanonicalVariable::new("a", "A")
                .with_unit("m")
                .with_domain("water")
                .with_property_uri("http://example.org/a"),
            CanonicalVariable::new("b", "B").with_domain("water"),
            CanonicalVariable::new("c", "C").with_unit("ppb").with_domain("air"),
            CanonicalVariable::new("d", "D").with_unit("m"),
        ]);

        let report = quality_report(&merged, 60, Utc::now());

        assert_eq!(report.missing_uris, 3);
        assert_eq!(report.missing_units, 1);
        assert_eq!(report.coverage_by_domain.get("water"), Some(&2));
        assert_eq!(report.unassigned_domain, 1);
        let text = report.recommendations.join("\n");
        assert!(text.contains("3 of 4 variables (75%) lack an observed property URI"));
        assert!(text.contains("1 of 4 variables (25%) have no preferred unit"));
        assert!(text.contains("Domain 'air' has a single variable"));
        assert!(!text.contains("Domain 'water'"));
        assert!(text.contains("60 suggestions await review"));
    }

    #[test]
    fn quality_score_formula() {
        let merged = registry_of(vec![
            CanonicalVariable::new("a", "A")
                .with_unit("m")
                .with_domain("water")
                .with_property_uri("http://example.org/a"),
            CanonicalVariable::new("b", "B").with_domain("air"),
        ]);
        let report = quality_report(&merged, 0, Utc::now());
        // 100 * (0.4 * 0.5 + 0.4 * 0.5 + 0.2 * 2/7)
        let expected = 100.0 * (0.4 * 0.5 + 0.4 * 0.5 + 0.2 * (2.0 / 7.0));
        assert!((report.quality_score() - expected).abs() < 1e-9);
    }
}
