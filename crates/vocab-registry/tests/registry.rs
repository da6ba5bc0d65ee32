use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;
use vocab_model::{CanonicalVariable, DeltaEntry, LayerDocument, MatchSuggestion};
use vocab_registry::{CanonicalRegistry, LayerFiles, LayerKind};

fn document(variables: Vec<CanonicalVariable>) -> LayerDocument {
    let mut document = LayerDocument::default();
    for variable in variables {
        document.insert_variable(variable);
    }
    document
}

fn suggestion(dataset: &str, native_id: &str) -> MatchSuggestion {
    MatchSuggestion {
        dataset: dataset.to_string(),
        native_id: native_id.to_string(),
        native_label: Some("Gage height".to_string()),
        native_unit: Some("ft".to_string()),
        canonical: "water:gage_height_ft".to_string(),
        score: 0.72,
        reasons: vec!["label_hint".to_string()],
    }
}

#[test]
fn overrides_take_precedence_over_seed() {
    let registry = CanonicalRegistry::in_memory();
    registry
        .write_seed(&document(vec![
            CanonicalVariable::new("water:discharge_cfs", "Discharge").with_unit("X"),
            CanonicalVariable::new("water:stage_ft", "Stage"),
        ]))
        .unwrap();
    registry
        .write_harvest(&document(vec![CanonicalVariable::new("air:pm25", "PM2.5")]))
        .unwrap();
    registry
        .write_overrides(&document(vec![
            CanonicalVariable::new("water:discharge_cfs", "Discharge").with_unit("Y"),
        ]))
        .unwrap();

    let merged = registry.merged();
    assert_eq!(merged.len(), 3);
    assert_eq!(
        merged.variables["water:discharge_cfs"].preferred_unit.as_deref(),
        Some("Y")
    );
}

#[test]
fn delta_never_participates_in_merge() {
    let registry = CanonicalRegistry::in_memory();
    registry
        .update_delta(|delta| {
            delta.insert(DeltaEntry::pending(
                &suggestion("USGS_NWIS", "00065"),
                None,
                chrono_now(),
            ))
        })
        .unwrap();
    assert!(registry.merged().is_empty());
    assert_eq!(registry.get_delta().pending_count(), 1);
}

#[test]
fn file_registry_round_trips_layers() {
    let dir = tempdir().unwrap();
    let registry = CanonicalRegistry::open(dir.path(), &LayerFiles::default()).unwrap();
    registry
        .write_seed(&document(vec![
            CanonicalVariable::new("water:temperature_c", "Water temperature").with_unit("degC"),
        ]))
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("seed.json")).unwrap();
    assert!(raw.contains("water:temperature_c"));

    let reopened = CanonicalRegistry::open(dir.path(), &LayerFiles::default()).unwrap();
    let seed = reopened.load_seed().unwrap();
    assert_eq!(seed.variables["water:temperature_c"].label, "Water temperature");
}

#[test]
fn malformed_layer_falls_back_to_empty_but_blocks_updates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("overrides.json"), "{ not json").unwrap();
    let registry = CanonicalRegistry::open(dir.path(), &LayerFiles::default()).unwrap();

    assert!(registry.get_overrides().is_empty());
    assert!(registry.load_overrides().is_err());

    let result = registry.update_overrides(|doc| {
        doc.insert_variable(CanonicalVariable::new("a", "A"));
    });
    assert!(result.is_err());
    assert_eq!(
        fs::read_to_string(dir.path().join("overrides.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn unchanged_update_does_not_rewrite_layer() {
    let registry = CanonicalRegistry::in_memory();
    assert_eq!(registry.fingerprint(LayerKind::Overrides).unwrap(), None);
    registry.update_overrides(|_| ()).unwrap();
    assert_eq!(registry.fingerprint(LayerKind::Overrides).unwrap(), None);

    registry
        .update_overrides(|doc| doc.insert_variable(CanonicalVariable::new("a", "A")))
        .unwrap();
    let first = registry.fingerprint(LayerKind::Overrides).unwrap();
    assert!(first.is_some());
    registry.update_overrides(|doc| doc.variables.len()).unwrap();
    assert_eq!(registry.fingerprint(LayerKind::Overrides).unwrap(), first);
}

#[test]
fn concurrent_updates_are_serialized() {
    let registry = Arc::new(CanonicalRegistry::in_memory());
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .update_seed(|doc| {
                        doc.insert_variable(CanonicalVariable::new(format!("v{n}"), "Label"));
                    })
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.get_seed().variables.len(), 8);
}

#[test]
fn curation_update_writes_both_layers() {
    let registry = CanonicalRegistry::in_memory();
    registry
        .update_curation(|overrides, delta| {
            overrides.insert_variable(CanonicalVariable::new("water:gage_height_ft", "Gage height"));
            delta.insert(DeltaEntry::pending(
                &suggestion("USGS_NWIS", "00065"),
                Some("water".to_string()),
                chrono_now(),
            ));
        })
        .unwrap();
    assert!(registry.merged().contains("water:gage_height_ft"));
    assert!(registry.get_delta().get("USGS_NWIS", "00065").is_some());
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
