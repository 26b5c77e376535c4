use super::common::*;
use crate::scoring::regulatory::{evaluate_framework, FrameworkCriteria};
use crate::scoring::{
    Band, Dimension, DimensionScores, FlagKind, Framework, GateContext, GateOutcome, Provenance,
    RegulatoryGateResult, ScoringError, SfdrArticle,
};

#[test]
fn uniform_eighty_is_dark_green_article_9() {
    let result = assess(DimensionScores::uniform(80.0));

    assert_eq!(result.composite.presented(), 80.0);
    assert!(!result.veto.is_triggered());
    assert_eq!(result.banding.raw, Band::DarkGreen);
    assert_eq!(result.band(), Band::DarkGreen);
    assert_eq!(result.sfdr_article(), Some(SfdrArticle::Article9));
    assert_eq!(
        result.gates.outcome(Framework::Sfdr),
        Some(GateOutcome::Pass)
    );
}

#[test]
fn gender_veto_downgrades_dark_green_to_amber() {
    let result = assess(DimensionScores::uniform(90.0).with(Dimension::Gender, 20.0));

    assert!((result.composite.value() - 76.0).abs() < 1e-9);
    assert_eq!(result.veto.triggered_by, vec![Dimension::Gender]);
    assert_eq!(result.banding.raw, Band::DarkGreen);
    assert_eq!(result.band(), Band::Amber);
    assert_eq!(result.sfdr_article(), Some(SfdrArticle::Article6));

    let first = result.flags.first().expect("veto warning present");
    assert_eq!(first.kind, FlagKind::Warning);
    assert_eq!(first.code, "social_veto.gender");
}

#[test]
fn social_mobility_veto_caps_green() {
    let result = assess(DimensionScores::uniform(65.0).with(Dimension::SocialMobility, 29.0));
    assert_eq!(result.banding.raw, Band::Green);
    assert_eq!(result.band(), Band::Amber);
}

#[test]
fn band_boundaries_follow_the_default_table() {
    for (value, expected) in [
        (34.0, Band::Red),
        (35.0, Band::Amber),
        (54.0, Band::Amber),
        (55.0, Band::Green),
        (74.0, Band::Green),
        (75.0, Band::DarkGreen),
    ] {
        let result = assess(DimensionScores::uniform(value));
        assert_eq!(result.band(), expected, "composite {value}");
    }
}

#[test]
fn displayed_composite_and_band_agree_just_below_a_boundary() {
    let result = assess(DimensionScores::uniform(54.999_999_999_5));

    assert_eq!(result.composite.presented(), 55.0);
    assert_eq!(result.band(), Band::Green);
}

#[test]
fn missing_water_data_is_proxied_and_annotated() {
    let mut record = disclosed_record("no-water");
    record.water_intensity = None;

    let result = engine().score(&record).expect("proxy keeps the record scorable");

    assert!(result.proxy_used());
    let note = result
        .notes
        .iter()
        .find(|note| note.field == "water_intensity")
        .expect("water proxy note");
    assert_eq!(note.dimensions, vec![Dimension::Water]);
    assert_eq!(
        result.scores.get(Dimension::Water).provenance,
        Provenance::Proxied
    );
    assert_eq!(
        result.scores.get(Dimension::Climate).provenance,
        Provenance::Measured
    );
}

#[test]
fn record_without_proxy_source_fails_alone_in_batch() {
    let mut orphan = disclosed_record("orphan");
    orphan.country = None;

    let outcome = engine().score_batch(&[
        disclosed_record("first"),
        orphan,
        disclosed_record("third"),
    ]);

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    match &outcome.records[1].result {
        Err(ScoringError::MissingDimensionData {
            project_id,
            dimensions,
        }) => {
            assert_eq!(project_id, "orphan");
            assert!(dimensions.contains(&Dimension::Territory));
        }
        other => panic!("expected MissingDimensionData, got {other:?}"),
    }
    assert!(outcome.records[0].result.is_ok());
    assert!(outcome.records[2].result.is_ok());
}

#[test]
fn unknown_country_scores_with_fallback_indices() {
    let mut record = disclosed_record("atlantis");
    record.country = Some("Atlantis".to_string());

    let result = engine().score(&record).expect("fallback row applies");

    assert!(result.notes.iter().any(|note| note.field == "country"));
    assert_eq!(
        result.scores.get(Dimension::Territory).provenance,
        Provenance::Proxied
    );
}

#[test]
fn gate_results_do_not_depend_on_evaluation_order() {
    let result = engine()
        .score(&disclosed_record("order"))
        .expect("scores");
    let criteria = FrameworkCriteria::default();
    let context = GateContext {
        scores: &result.scores,
        composite: result.composite,
        veto: &result.veto,
        band: result.band(),
        project: &result.context,
    };

    let reversed = Framework::ordered()
        .into_iter()
        .rev()
        .map(|framework| evaluate_framework(framework, &context, &criteria))
        .collect();

    assert_eq!(RegulatoryGateResult::from_gates(reversed), result.gates);
}

#[test]
fn disclosed_eu_renewable_project_passes_core_gates() {
    let result = engine()
        .score(&disclosed_record("solar"))
        .expect("scores");

    assert!(result.notes.is_empty());
    assert!(result.gates.taxonomy_aligned());
    assert_eq!(
        result.gates.outcome(Framework::Tcfd),
        Some(GateOutcome::Pass)
    );
    assert_eq!(result.pai.indicators().len(), 10);
}

#[test]
fn flags_never_change_band_or_gates() {
    let scores = DimensionScores::uniform(40.0).with(Dimension::Governance, 20.0);
    let result = assess(scores);

    assert!(result
        .flags
        .iter()
        .any(|flag| flag.code == "governance_risk"));
    assert_eq!(result.band(), Band::Amber);
}
