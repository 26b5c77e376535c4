use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, DimensionScores};

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Tolerance absorbed before comparing or presenting a composite score, so that
/// float noise such as `79.99999999999999` never changes a band or a displayed digit.
pub const SCORE_EPSILON: f64 = 1e-9;

/// One weight per dimension. Construct through [`WeightTable::new`] or deserialize and
/// call [`WeightTable::validate`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Dimension, f64>", into = "BTreeMap<Dimension, f64>")]
pub struct WeightTable {
    weights: [f64; Dimension::COUNT],
}

impl Default for WeightTable {
    fn default() -> Self {
        // Gender + social + governance carry half of the total.
        let mut weights = [0.0; Dimension::COUNT];
        weights[Dimension::Gender.index()] = 0.20;
        weights[Dimension::SocialMobility.index()] = 0.15;
        weights[Dimension::Governance.index()] = 0.15;
        weights[Dimension::Climate.index()] = 0.18;
        weights[Dimension::Pollution.index()] = 0.10;
        weights[Dimension::Water.index()] = 0.08;
        weights[Dimension::Territory.index()] = 0.08;
        weights[Dimension::Innovation.index()] = 0.06;
        Self { weights }
    }
}

impl WeightTable {
    pub fn new(entries: impl IntoIterator<Item = (Dimension, f64)>) -> Result<Self, String> {
        let mut weights = [f64::NAN; Dimension::COUNT];
        for (dimension, weight) in entries {
            weights[dimension.index()] = weight;
        }
        let table = Self { weights };
        table.validate()?;
        Ok(table)
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights[dimension.index()]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        for dimension in Dimension::ordered() {
            let weight = self.weight(dimension);
            if weight.is_nan() {
                return Err(format!("weights.{}: missing", dimension.key()));
            }
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(format!(
                    "weights.{}: {weight} must be between 0.0 and 1.0",
                    dimension.key()
                ));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("weights must sum to 1.0, but sum to {sum:.6}"));
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<Dimension, f64>> for WeightTable {
    type Error = String;

    fn try_from(map: BTreeMap<Dimension, f64>) -> Result<Self, Self::Error> {
        let mut weights = [f64::NAN; Dimension::COUNT];
        for (dimension, weight) in map {
            weights[dimension.index()] = weight;
        }
        // Range and sum checks run in `EngineConfig::validate` so they surface as typed errors.
        Ok(Self { weights })
    }
}

impl From<WeightTable> for BTreeMap<Dimension, f64> {
    fn from(table: WeightTable) -> Self {
        Dimension::ordered()
            .into_iter()
            .map(|dimension| (dimension, table.weight(dimension)))
            .collect()
    }
}

/// Weighted aggregate of the eight dimension scores, in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeScore(f64);

impl CompositeScore {
    /// Wrap an externally computed score, clamping into [0, 100].
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 100.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Presentation value: rounded down to one decimal after absorbing float noise. Bands
    /// are looked up on this value, so a displayed score always agrees with its band.
    pub fn presented(self) -> f64 {
        ((self.0 + SCORE_EPSILON) * 10.0).floor() / 10.0
    }
}

/// Half-up to one decimal, for reported figures. Composite scores use
/// [`CompositeScore::presented`] instead.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Plain weighted sum; no rounding is applied here.
pub fn composite(scores: &DimensionScores, weights: &WeightTable) -> CompositeScore {
    let sum = scores
        .iter()
        .map(|(dimension, score)| weights.weight(dimension) * score.value)
        .sum::<f64>();
    CompositeScore::new(sum)
}
