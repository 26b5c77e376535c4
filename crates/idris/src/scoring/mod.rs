//! IDRIS impact scoring: normalization, weighted aggregation, social veto, banding,
//! regulatory gates, PAI indicators and due-diligence flags.

mod aggregate;
mod band;
pub mod domain;
mod engine;
pub mod flags;
mod normalizer;
pub mod pai;
pub mod reference;
pub mod regulatory;
mod veto;

#[cfg(test)]
mod tests;

pub(crate) use aggregate::round1;
pub use aggregate::{
    composite, CompositeScore, WeightTable, SCORE_EPSILON, WEIGHT_SUM_TOLERANCE,
};
pub use band::{BandRange, BandTable, Banding};
pub use domain::{
    Band, Dimension, DimensionScore, DimensionScores, ProjectRecord, Provenance, ProxyNote,
    Resolved, RiskLevel,
};
pub use engine::{BatchOutcome, RecordOutcome, ScoredResult, ScoringEngine, ScoringError};
pub use flags::{DueDiligenceFlag, FlagKind};
pub use normalizer::{normalize, size_factor, Normalized, ProjectContext, ProxyDefaults};
pub use pai::{PaiIndicator, PaiIndicatorSet, PaiMeasure, PaiMetric};
pub use reference::{CountryProfile, ReferenceData, SectorProfile};
pub use regulatory::{
    Criterion, Framework, FrameworkCriteria, FrameworkDetail, FrameworkGate, GateContext,
    GateOutcome, InvestorProfile, RegulatoryGateResult, SfdrArticle,
};
pub use veto::{VetoFlag, VetoPolicy, DEFAULT_VETO_THRESHOLD, VETO_DIMENSIONS};
