//! IDRIS: deterministic impact scoring with EU sustainable-finance regulatory gates.
//!
//! [`ScoringEngine`] turns raw [`ProjectRecord`]s into [`ScoredResult`]s. Configuration
//! lives in [`config`], file import and export in [`export`].

pub mod config;
pub mod error;
pub mod export;
pub mod scoring;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, EngineConfig};
pub use error::AppError;
pub use scoring::{
    Band, BatchOutcome, Dimension, Framework, GateOutcome, ProjectRecord, ScoredResult,
    ScoringEngine, ScoringError, SfdrArticle,
};
