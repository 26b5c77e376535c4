//! End-to-end scoring of the bundled sample portfolio through the public API.

use idris::export::read_records_csv;
use idris::scoring::{Dimension, FlagKind, Framework, GateOutcome, Provenance};
use idris::{Band, BatchOutcome, ScoredResult, ScoringEngine, ScoringError};

fn sample_outcome() -> BatchOutcome {
    let data = include_bytes!("../sample_portfolio.csv");
    let records = read_records_csv(&data[..]).expect("sample portfolio parses");
    ScoringEngine::default().score_batch(&records)
}

fn scored<'a>(outcome: &'a BatchOutcome, project_id: &str) -> &'a ScoredResult {
    outcome
        .scored()
        .find(|result| result.project_id == project_id)
        .unwrap_or_else(|| panic!("{project_id} should score"))
}

#[test]
fn sample_portfolio_scores_all_but_the_orphan() {
    let outcome = sample_outcome();

    assert_eq!(outcome.records.len(), 6);
    assert_eq!(outcome.succeeded, 5);
    assert_eq!(outcome.failed, 1);

    let (record, err) = outcome.failures().next().expect("one failure");
    assert_eq!(record.index, 5);
    match err {
        ScoringError::MissingDimensionData { project_id, .. } => {
            assert_eq!(project_id, "orphan-06")
        }
    }
}

#[test]
fn disclosed_renewable_project_is_taxonomy_aligned() {
    let outcome = sample_outcome();
    let solar = scored(&outcome, "solar-de-01");

    assert!(!solar.proxy_used());
    assert!(solar.gates.taxonomy_aligned());
    assert!(solar.band() >= Band::Green);
    assert_eq!(solar.gates.outcome(Framework::Csrd), Some(GateOutcome::Pass));
}

#[test]
fn extractive_project_with_low_gender_score_is_vetoed() {
    let outcome = sample_outcome();
    let mine = scored(&outcome, "mine-ng-03");

    assert!(mine.veto.triggered_by.contains(&Dimension::Gender));
    assert!(mine.band() <= Band::Amber);
    assert_eq!(mine.gates.outcome(Framework::EuTaxonomy), Some(GateOutcome::Fail));

    let first_warning = mine
        .flags
        .iter()
        .find(|flag| flag.kind == FlagKind::Warning)
        .expect("warnings present");
    assert_eq!(first_warning.code, "social_veto.gender");
    assert!(mine.pai.adverse_count() > 0);
}

#[test]
fn unknown_country_and_missing_inputs_are_proxied() {
    let outcome = sample_outcome();

    let fintech = scored(&outcome, "fintech-xx-05");
    assert!(fintech.notes.iter().any(|note| note.field == "country"));
    assert_eq!(
        fintech.scores.get(Dimension::Territory).provenance,
        Provenance::Proxied
    );

    let clinic = scored(&outcome, "clinic-ke-02");
    assert!(clinic.notes.iter().any(|note| note.field == "water_intensity"));
    assert_eq!(
        clinic.scores.get(Dimension::Water).provenance,
        Provenance::Proxied
    );
}

#[test]
fn every_scored_project_carries_five_gates_and_ten_indicators() {
    let outcome = sample_outcome();
    for result in outcome.scored() {
        let frameworks: Vec<Framework> = result
            .gates
            .gates()
            .iter()
            .map(|gate| gate.framework)
            .collect();
        assert_eq!(frameworks, Framework::ordered().to_vec());
        assert_eq!(result.pai.indicators().len(), 10);
        assert!(result.sfdr_article().is_some());
    }
}

#[test]
fn rescoring_the_portfolio_is_deterministic() {
    assert_eq!(sample_outcome(), sample_outcome());
}
