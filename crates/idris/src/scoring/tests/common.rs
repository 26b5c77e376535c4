use crate::scoring::regulatory::tests_support::project_context_for;
use crate::scoring::{
    DimensionScores, Normalized, ProjectContext, ProjectRecord, ScoredResult, ScoringEngine,
};

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::default()
}

/// EU renewable project with every raw indicator reported.
pub(super) fn disclosed_record(project_id: &str) -> ProjectRecord {
    ProjectRecord::new(
        project_id,
        "Germany",
        "Renewable Energy",
        "Green Bond",
        12_000_000.0,
    )
    .with_ghg_intensity(0.05)
    .with_gender_equality(0.65)
    .with_social_factor(0.7)
    .with_water_intensity(0.1)
}

pub(super) fn project_context() -> ProjectContext {
    project_context_for("Germany", "Renewable Energy", 2_000_000.0)
}

pub(super) fn normalized(scores: DimensionScores) -> Normalized {
    Normalized {
        scores,
        context: project_context(),
        notes: Vec::new(),
    }
}

/// Score precomputed dimension values through the rest of the pipeline.
pub(super) fn assess(scores: DimensionScores) -> ScoredResult {
    engine().assess("fixture", String::new(), normalized(scores))
}
