use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::aggregate::{composite, CompositeScore};
use super::band::Banding;
use super::domain::{Band, Dimension, DimensionScores, ProjectRecord, ProxyNote};
use super::flags::{self, DueDiligenceFlag};
use super::normalizer::{normalize, Normalized, ProjectContext};
use super::pai::{self, PaiIndicatorSet};
use super::regulatory::{self, GateContext, RegulatoryGateResult, SfdrArticle};
use super::veto::VetoFlag;
use crate::config::{ConfigError, EngineConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("project '{project_id}': no data or proxy for {}", dimension_list(.dimensions))]
    MissingDimensionData {
        project_id: String,
        dimensions: Vec<Dimension>,
    },
}

fn dimension_list(dimensions: &[Dimension]) -> String {
    dimensions
        .iter()
        .map(|dimension| dimension.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Complete, deterministic output for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub project_id: String,
    /// SHA-256 of the input record; identical inputs always produce identical results.
    pub input_hash: String,
    pub scores: DimensionScores,
    pub notes: Vec<ProxyNote>,
    pub composite: CompositeScore,
    pub veto: VetoFlag,
    pub banding: Banding,
    pub gates: RegulatoryGateResult,
    pub pai: PaiIndicatorSet,
    pub flags: Vec<DueDiligenceFlag>,
    pub context: ProjectContext,
}

impl ScoredResult {
    /// Band after the social veto cap.
    pub fn band(&self) -> Band {
        self.banding.effective
    }

    pub fn sfdr_article(&self) -> Option<SfdrArticle> {
        self.gates.sfdr_article()
    }

    pub fn proxy_used(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Per-record batch outcome; `index` is the position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub index: usize,
    pub project_id: String,
    pub result: Result<ScoredResult, ScoringError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub records: Vec<RecordOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn scored(&self) -> impl Iterator<Item = &ScoredResult> + '_ {
        self.records
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&RecordOutcome, &ScoringError)> + '_ {
        self.records
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|err| (outcome, err)))
    }
}

/// Stateless scoring pipeline over a validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: EngineConfig,
}

impl ScoringEngine {
    /// Validates the configuration once; an engine never holds an invalid one.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn score(&self, record: &ProjectRecord) -> Result<ScoredResult, ScoringError> {
        let normalized = normalize(record, &self.config.reference, &self.config.proxy).map_err(
            |dimensions| {
                warn!(
                    project_id = %record.project_id,
                    dimensions = %dimension_list(&dimensions),
                    "record lacks data for required dimensions"
                );
                ScoringError::MissingDimensionData {
                    project_id: record.project_id.clone(),
                    dimensions,
                }
            },
        )?;

        for note in &normalized.notes {
            warn!(
                project_id = %record.project_id,
                field = %note.field,
                detail = %note.detail,
                "proxy substituted"
            );
        }

        Ok(self.assess(&record.project_id, record.content_hash(), normalized))
    }

    /// Run aggregation, veto, banding, gates, PAI and flags over already normalized inputs.
    pub fn assess(
        &self,
        project_id: &str,
        input_hash: String,
        normalized: Normalized,
    ) -> ScoredResult {
        let config = &self.config;
        let Normalized {
            scores,
            context: project,
            notes,
        } = normalized;

        let composite = composite(&scores, &config.weights);
        let veto = config.veto.evaluate(&scores);
        let banding = config.bands.classify(composite, &veto);

        let context = GateContext {
            scores: &scores,
            composite,
            veto: &veto,
            band: banding.effective,
            project: &project,
        };
        let (gates, pai) = rayon::join(
            || regulatory::evaluate_all(&context, &config.frameworks),
            || pai::evaluate(&project, &scores),
        );
        let flags = flags::generate(&scores, &veto, config.veto.threshold, &gates);

        debug!(
            project_id,
            composite = composite.presented(),
            band = %banding.effective,
            vetoed = veto.is_triggered(),
            "scored project"
        );

        ScoredResult {
            project_id: project_id.to_string(),
            input_hash,
            scores,
            notes,
            composite,
            veto,
            banding,
            gates,
            pai,
            flags,
            context: project,
        }
    }

    /// Score records in parallel. A failing record never aborts the batch and outcomes keep
    /// input order.
    pub fn score_batch(&self, records: &[ProjectRecord]) -> BatchOutcome {
        let outcomes: Vec<RecordOutcome> = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| RecordOutcome {
                index,
                project_id: record.project_id.clone(),
                result: self.score(record),
            })
            .collect();

        let failed = outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .count();
        let succeeded = outcomes.len() - failed;
        info!(total = outcomes.len(), succeeded, failed, "batch scored");

        BatchOutcome {
            records: outcomes,
            succeeded,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProjectRecord {
        ProjectRecord::new(id, "France", "Renewable Energy", "Green Bond", 8_000_000.0)
            .with_ghg_intensity(0.05)
            .with_gender_equality(0.7)
            .with_social_factor(0.7)
            .with_water_intensity(0.1)
    }

    #[test]
    fn new_rejects_invalid_configuration() {
        let mut config = EngineConfig::default();
        config.veto.threshold = -1.0;
        let err = ScoringEngine::new(config).expect_err("negative veto threshold");
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }

    #[test]
    fn scoring_is_deterministic() {
        let engine = ScoringEngine::default();
        let first = engine.score(&record("p-1")).expect("scores");
        let second = engine.score(&record("p-1")).expect("scores");
        assert_eq!(first, second);
        assert_eq!(first.input_hash.len(), 64);
    }

    #[test]
    fn missing_data_error_names_project_and_dimensions() {
        let mut incomplete = record("p-missing");
        incomplete.country = None;
        let err = ScoringEngine::default()
            .score(&incomplete)
            .expect_err("no country proxy");

        let ScoringError::MissingDimensionData {
            project_id,
            dimensions,
        } = &err;
        assert_eq!(project_id, "p-missing");
        assert!(dimensions.contains(&Dimension::Gender));
        assert!(err.to_string().contains("gender"));
    }

    #[test]
    fn batch_keeps_input_order_and_counts() {
        let mut broken = record("b");
        broken.sector = None;
        broken.ghg_intensity = None;
        let outcome = ScoringEngine::default().score_batch(&[record("a"), broken, record("c")]);

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        let ids: Vec<&str> = outcome
            .records
            .iter()
            .map(|outcome| outcome.project_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(outcome.failures().next().map(|(o, _)| o.index), Some(1));
    }
}
