//! Matching behavior of the term broker.

use vocab_map::{MatchThresholds, TermBroker};
use vocab_model::{CanonicalVariable, NativeParameter, RuleBook, RulePack};
use vocab_registry::MergedRegistry;

fn registry(variables: Vec<CanonicalVariable>) -> MergedRegistry {
    let mut merged = MergedRegistry::default();
    for variable in variables {
        merged.variables.insert(variable.id.clone(), variable);
    }
    merged
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn exact_map_with_matching_unit_scores_098() {
    let merged = registry(vec![
        CanonicalVariable::new("water:discharge_cfs", "Streamflow").with_unit("ft3/s"),
    ]);
    let rules = RuleBook::new().with_pack(
        "USGS_NWIS",
        RulePack::new().exact("00060", "water:discharge_cfs"),
    );
    let broker = TermBroker::new(rules);
    let parameter = NativeParameter::new("USGS_NWIS", "00060")
        .with_label("Discharge")
        .with_unit("ft3/s");

    let outcome = broker.match_parameters("USGS_NWIS", &[parameter], &merged);

    assert!(outcome.suggested.is_empty());
    assert_eq!(outcome.accepted.len(), 1);
    let accepted = &outcome.accepted[0];
    assert_eq!(accepted.canonical, "water:discharge_cfs");
    assert_eq!(accepted.score, 0.98);
    assert_eq!(accepted.reasons, vec!["exact:00060", "unit:eq"]);
    assert_eq!(accepted.native_label.as_deref(), Some("Discharge"));
}

#[test]
fn exact_map_alone_reaches_095() {
    let merged = registry(vec![
        CanonicalVariable::new("air:pm25", "Fine particulate matter").with_unit("ug/m3"),
    ]);
    let rules = RuleBook::new().with_pack("AQS", RulePack::new().exact("88101", "air:pm25"));
    let broker = TermBroker::new(rules);

    for unit in [None, Some("ppb"), Some("widgets")] {
        let mut parameter = NativeParameter::new("AQS", "88101");
        if let Some(unit) = unit {
            parameter = parameter.with_unit(unit);
        }
        let outcome = broker.match_parameters("AQS", &[parameter], &merged);
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.accepted[0].score >= 0.95);
    }
}

#[test]
fn containment_alone_is_dropped() {
    let merged = registry(vec![CanonicalVariable::new("temperature", "Temperature")]);
    let broker = TermBroker::default();
    let parameter = NativeParameter::new("NOAA", "wtmp").with_label("Water temperature");

    let ranked = broker.score_parameter("NOAA", &parameter, &merged);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score(), 0.20);
    assert_eq!(ranked[0].reasons(), vec!["label:contains"]);

    let outcome = broker.match_parameters("NOAA", &[parameter], &merged);
    assert!(outcome.is_empty());
}

#[test]
fn duplicate_keys_keep_highest_accepted_score() {
    let merged = registry(vec![
        CanonicalVariable::new("water:discharge", "Discharge")
            .with_unit("ft3/s")
            .with_domain("water"),
    ]);
    let rules = RuleBook::new().with_pack("SITE", RulePack::new().label_hint("Q", "discharge"));
    let broker = TermBroker::new(rules);
    let parameters = [
        NativeParameter::new("SITE", "Q")
            .with_label("Daily discharge")
            .with_domain("water"),
        NativeParameter::new("SITE", "Q")
            .with_label("Mean discharge")
            .with_unit("cfs"),
    ];

    let outcome = broker.match_parameters("SITE", &parameters, &merged);

    assert_eq!(outcome.accepted.len(), 1);
    assert!(close(outcome.accepted[0].score, 0.93));
    assert_eq!(
        outcome.accepted[0].reasons,
        vec!["label_hint", "label:contains", "unit:eq"]
    );
}

#[test]
fn hint_only_match_is_suggested() {
    let merged = registry(vec![CanonicalVariable::new("water:gage_height", "Gage height")]);
    let rules = RuleBook::new().with_pack("SITE", RulePack::new().label_hint("00065", "Gage height"));
    let broker = TermBroker::new(rules);
    let parameter = NativeParameter::new("SITE", "00065");

    let outcome = broker.match_parameters("SITE", &[parameter], &merged);

    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.suggested.len(), 1);
    assert!(close(outcome.suggested[0].score, 0.70));
    assert_eq!(outcome.suggested[0].reasons, vec!["label_hint"]);
}

#[test]
fn convertible_unit_earns_smaller_bonus() {
    let merged = registry(vec![
        CanonicalVariable::new("water:do", "Dissolved oxygen").with_unit("mg/L"),
    ]);
    let broker = TermBroker::default();
    let parameter = NativeParameter::new("WQP", "DO")
        .with_label("Dissolved_Oxygen")
        .with_unit("ppm");

    let ranked = broker.score_parameter("WQP", &parameter, &merged);
    assert_eq!(ranked[0].reasons(), vec!["label:exact", "unit:convertible"]);
    assert!(close(ranked[0].score(), 0.27));
}

#[test]
fn rule_pack_unit_aliases_apply() {
    let merged = registry(vec![
        CanonicalVariable::new("water:discharge_cfs", "Streamflow").with_unit("ft3/s"),
    ]);
    let rules = RuleBook::new().with_pack(
        "LEGACY",
        RulePack::new()
            .exact("Q", "water:discharge_cfs")
            .unit_alias("cu.ft/sec", "ft3/s"),
    );
    let broker = TermBroker::new(rules);
    let parameter = NativeParameter::new("LEGACY", "Q").with_unit("cu.ft/sec");

    let outcome = broker.match_parameters("LEGACY", &[parameter], &merged);
    assert_eq!(outcome.accepted[0].reasons, vec!["exact:Q", "unit:eq"]);
}

#[test]
fn ties_resolve_to_smallest_canonical_id() {
    let merged = registry(vec![
        CanonicalVariable::new("b:temperature", "Temperature"),
        CanonicalVariable::new("a:temperature", "Temperature"),
    ]);
    let broker = TermBroker::default().with_thresholds(
        MatchThresholds::new(0.9, 0.2).expect("valid thresholds"),
    );
    let parameter = NativeParameter::new("X", "t").with_label("temperature");

    let outcome = broker.match_parameters("X", &[parameter], &merged);
    assert_eq!(outcome.suggested.len(), 1);
    assert_eq!(outcome.suggested[0].canonical, "a:temperature");
}

#[test]
fn unknown_exact_target_is_skipped() {
    let merged = registry(vec![CanonicalVariable::new("water:stage", "Stage")]);
    let rules = RuleBook::new().with_pack("SITE", RulePack::new().exact("00065", "water:missing"));
    let broker = TermBroker::new(rules);
    let parameter = NativeParameter::new("SITE", "00065").with_label("Stage");

    let ranked = broker.score_parameter("SITE", &parameter, &merged);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].canonical, "water:stage");
    assert_eq!(ranked[0].reasons(), vec!["label:exact"]);
}

#[test]
fn domain_bonus_requires_an_existing_candidate() {
    let merged = registry(vec![
        CanonicalVariable::new("air:ozone", "Ozone").with_domain("air"),
    ]);
    let broker = TermBroker::default();
    let parameter = NativeParameter::new("AQS", "44201")
        .with_label("Nitrogen dioxide")
        .with_domain("air");

    assert!(broker.score_parameter("AQS", &parameter, &merged).is_empty());
}

#[test]
fn outcome_statistics() {
    let merged = registry(vec![
        CanonicalVariable::new("water:discharge_cfs", "Streamflow").with_unit("ft3/s"),
        CanonicalVariable::new("water:gage_height", "Gage height"),
    ]);
    let rules = RuleBook::new().with_pack(
        "USGS_NWIS",
        RulePack::new()
            .exact("00060", "water:discharge_cfs")
            .label_hint("00065", "gage height"),
    );
    let broker = TermBroker::new(rules);
    let parameters = [
        NativeParameter::new("USGS_NWIS", "00060").with_unit("cfs"),
        NativeParameter::new("USGS_NWIS", "00065"),
        NativeParameter::new("USGS_NWIS", "99999").with_label("Unrelated"),
    ];

    let outcome = broker.match_parameters("USGS_NWIS", &parameters, &merged);

    assert_eq!(outcome.total(), 2);
    let counts = outcome.count_by_band();
    assert_eq!(counts.get(&vocab_map::ConfidenceBand::VeryHigh), Some(&1));
    assert_eq!(counts.get(&vocab_map::ConfidenceBand::High), Some(&1));
    assert_eq!(outcome.filter_by_band(vocab_map::ConfidenceBand::VeryHigh).len(), 1);
    let average = outcome.average_score().expect("two matches");
    assert!(close(average, (0.98 + 0.70) / 2.0));
    assert!(close(outcome.min_score().expect("two matches"), 0.70));
    assert!(close(outcome.max_score().expect("two matches"), 0.98));

    let empty = vocab_map::MatchOutcome::default();
    assert_eq!(empty.min_score(), None);
    assert_eq!(empty.max_score(), None);
}
