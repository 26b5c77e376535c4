use serde::{Deserialize, Serialize};

use super::domain::{Dimension, DimensionScores};

pub const DEFAULT_VETO_THRESHOLD: f64 = 30.0;

/// The two social dimensions that can veto a Green or Dark Green band.
pub const VETO_DIMENSIONS: [Dimension; 2] = [Dimension::Gender, Dimension::SocialMobility];

/// Hard social floor: no aggregate can mask a score below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VetoPolicy {
    pub threshold: f64,
}

impl Default for VetoPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_VETO_THRESHOLD,
        }
    }
}

impl VetoPolicy {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.threshold.is_finite() && (0.0..=100.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(format!(
                "veto.threshold: {} must be between 0 and 100",
                self.threshold
            ))
        }
    }

    /// Strict comparison: a score exactly at the threshold does not veto.
    pub fn evaluate(&self, scores: &DimensionScores) -> VetoFlag {
        let triggered_by = VETO_DIMENSIONS
            .into_iter()
            .filter(|dimension| scores.value(*dimension) < self.threshold)
            .collect();
        VetoFlag { triggered_by }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VetoFlag {
    pub triggered_by: Vec<Dimension>,
}

impl VetoFlag {
    pub fn is_triggered(&self) -> bool {
        !self.triggered_by.is_empty()
    }
}
