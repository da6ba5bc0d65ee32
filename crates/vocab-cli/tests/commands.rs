//! Command functions against a file-backed registry in a temp directory.

use std::collections::BTreeMap;

use chrono::Utc;
use tempfile::TempDir;
use vocab_cli::commands::{
    Session, run_accept, run_batch, run_create, run_defer, run_reject, run_report, run_review,
    run_search, run_variables,
};
use vocab_curate::{ReviewFilter, VocabConfig};
use vocab_model::{
    CanonicalVariable, CurationKind, DeltaEntry, DeltaLayer, DeltaStatus, LayerDocument,
    MatchSuggestion,
};

fn pending(native_id: &str, canonical: &str, score: f64) -> DeltaEntry {
    let suggestion = MatchSuggestion {
        dataset: "USGS".to_string(),
        native_id: native_id.to_string(),
        native_label: Some(format!("Native {native_id}")),
        native_unit: None,
        canonical: canonical.to_string(),
        score,
        reasons: vec!["label:contains".to_string()],
    };
    DeltaEntry::pending(&suggestion, Some("water".to_string()), Utc::now())
}

fn session_in(dir: &TempDir) -> Session {
    let mut config = VocabConfig::default();
    config.registry.dir = dir.path().join("registry");
    config.curation.curator = "analyst".to_string();
    config.curation.audit_log = Some(dir.path().join("audit.jsonl"));
    let session = Session::from_config(config).unwrap();

    let mut seed = LayerDocument::default();
    seed.insert_variable(
        CanonicalVariable::new("water:discharge_cfs", "Discharge")
            .with_unit("ft3/s")
            .with_domain("water"),
    );
    seed.insert_variable(
        CanonicalVariable::new("water:temperature", "Water temperature")
            .with_unit("degC")
            .with_domain("water"),
    );
    seed.insert_variable(CanonicalVariable::new("air:ozone", "Ozone").with_domain("air"));
    session.registry.write_seed(&seed).unwrap();

    let mut delta = DeltaLayer::default();
    delta.insert(pending("00060", "water:discharge_cfs", 0.97));
    delta.insert(pending("00010", "water:temperature", 0.72));
    delta.insert(pending("00065", "water:discharge_cfs", 0.40));
    session.registry.write_delta(&delta).unwrap();
    session
}

#[test]
fn review_lists_pending_by_confidence() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let items = run_review(&session, &ReviewFilter::default());
    let keys: Vec<&str> = items.iter().map(|item| item.key.as_str()).collect();
    assert_eq!(keys, vec!["USGS:00060", "USGS:00010", "USGS:00065"]);

    let filtered = run_review(
        &session,
        &ReviewFilter {
            min_confidence: 0.7,
            ..ReviewFilter::default()
        },
    );
    assert_eq!(filtered.len(), 2);
}

#[test]
fn accept_persists_binding_and_audit_line() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let action = run_accept(&session, "USGS", "00060", None, BTreeMap::new()).unwrap();
    assert_eq!(action.action, CurationKind::Accept);
    assert_eq!(action.curator, "analyst");

    // A fresh session sees the decision on disk.
    let reopened = Session::from_config(session.config.clone()).unwrap();
    let merged = reopened.registry.merged();
    let binding = merged.variables["water:discharge_cfs"].binding("USGS").unwrap();
    assert_eq!(binding.native, "00060");
    let delta = reopened.registry.get_delta();
    assert_eq!(delta.get("USGS", "00060").unwrap().status, DeltaStatus::Accepted);

    let audit = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    assert_eq!(audit.lines().count(), 1);
}

#[test]
fn accept_with_modifications_is_recorded_as_modify() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    let modifications = BTreeMap::from([("note".to_string(), "provisional".to_string())]);

    let action = run_accept(&session, "USGS", "00010", None, modifications).unwrap();
    assert_eq!(action.action, CurationKind::Modify);
    assert_eq!(action.modifications["note"], "provisional");
}

#[test]
fn unknown_suggestion_is_an_error() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    assert!(run_accept(&session, "USGS", "99999", None, BTreeMap::new()).is_err());
    assert!(run_reject(&session, "USGS", "99999", "noise").is_err());
}

#[test]
fn reject_and_defer_update_the_queue() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let rejected = run_reject(&session, "USGS", "00065", "gage height, not discharge").unwrap();
    assert_eq!(rejected.action, CurationKind::Reject);
    let deferred = run_defer(&session, "USGS", "00010", "needs sensor metadata").unwrap();
    assert_eq!(deferred.action, CurationKind::Defer);

    let keys: Vec<String> = run_review(&session, &ReviewFilter::default())
        .into_iter()
        .map(|item| item.key)
        .collect();
    assert_eq!(keys, vec!["USGS:00060", "USGS:00010"]);
}

#[test]
fn create_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let variable = CanonicalVariable::new("water:gage_height", "Gage height").with_unit("ft");
    run_create(&session, variable.clone()).unwrap();
    assert!(run_create(&session, variable).is_err());
    assert!(session.registry.get_seed().variables.contains_key("water:gage_height"));
}

#[test]
fn batch_uses_configured_threshold() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let preview = run_batch(&session, None, true).unwrap();
    assert!(preview.dry_run);
    assert_eq!(preview.accepted, 1);
    assert_eq!(session.registry.get_delta().pending_count(), 3);

    let outcome = run_batch(&session, Some(0.7), false).unwrap();
    assert_eq!(outcome.accepted, 2);
    assert_eq!(session.registry.get_delta().pending_count(), 1);

    assert!(run_batch(&session, Some(2.0), false).is_err());
}

#[test]
fn report_and_variable_listing() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let report = run_report(&session);
    assert_eq!(report.total_variables, 3);
    assert_eq!(report.pending_suggestions, 3);
    assert_eq!(report.coverage_by_domain["water"], 2);

    let water = run_variables(&session, Some("WATER"));
    assert_eq!(water.len(), 2);
    assert_eq!(run_variables(&session, None).len(), 3);

    let similar = run_search(&session, "water temp", 5);
    assert_eq!(similar.first().map(|item| item.canonical.as_str()), Some("water:temperature"));
}
