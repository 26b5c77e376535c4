//! SFDR Principal Adverse Impact indicators.
//!
//! Each indicator is one row of [`INDICATORS`]: a metric, a pure function of the resolved
//! project inputs and dimension scores, and its own adversity rule. No indicator reads the
//! band or another indicator.

use serde::{Deserialize, Serialize};

use super::aggregate::round1;
use super::domain::{Dimension, DimensionScores};
use super::normalizer::ProjectContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaiMetric {
    GhgEmissions,
    CarbonFootprint,
    FossilFuelExposure,
    BiodiversitySensitiveAreas,
    EmissionsToWater,
    HazardousWaste,
    GenderPayGap,
    BoardGenderDiversity,
    AntiCorruption,
    NonCooperativeTaxJurisdiction,
}

impl PaiMetric {
    /// Indicator number in SFDR RTS Annex I, Table 1.
    pub const fn number(self) -> u8 {
        match self {
            Self::GhgEmissions => 1,
            Self::CarbonFootprint => 2,
            Self::FossilFuelExposure => 4,
            Self::BiodiversitySensitiveAreas => 7,
            Self::EmissionsToWater => 8,
            Self::HazardousWaste => 9,
            Self::GenderPayGap => 12,
            Self::BoardGenderDiversity => 13,
            Self::AntiCorruption => 15,
            Self::NonCooperativeTaxJurisdiction => 16,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::GhgEmissions => "GHG emissions",
            Self::CarbonFootprint => "Carbon footprint",
            Self::FossilFuelExposure => "Exposure to fossil fuel sector",
            Self::BiodiversitySensitiveAreas => "Activities affecting biodiversity-sensitive areas",
            Self::EmissionsToWater => "Emissions to water",
            Self::HazardousWaste => "Hazardous waste ratio",
            Self::GenderPayGap => "Unadjusted gender pay gap",
            Self::BoardGenderDiversity => "Board gender diversity",
            Self::AntiCorruption => "Anti-corruption and anti-bribery",
            Self::NonCooperativeTaxJurisdiction => "Non-cooperative tax jurisdictions",
        }
    }
}

/// Indicator reading: a 0-100 score (higher is better) or a yes/no exposure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PaiMeasure {
    Score(f64),
    Exposure(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaiIndicator {
    pub metric: PaiMetric,
    pub measure: PaiMeasure,
    /// Score floor below which the indicator is adverse; absent for exposures.
    pub threshold: Option<f64>,
    pub adverse: bool,
}

type ScoreFn = fn(&ProjectContext, &DimensionScores) -> f64;
type ExposureFn = fn(&ProjectContext) -> bool;

#[derive(Clone, Copy)]
enum Rule {
    Score { measure: ScoreFn, threshold: f64 },
    Exposure(ExposureFn),
}

const NON_COOPERATIVE_MAX_CPI: f64 = 40.0;

const INDICATORS: [(PaiMetric, Rule); 10] = [
    (
        PaiMetric::GhgEmissions,
        Rule::Score {
            measure: |project, _| (1.0 - project.ghg_intensity) * 100.0,
            threshold: 50.0,
        },
    ),
    (
        PaiMetric::CarbonFootprint,
        Rule::Score {
            measure: |project, _| (1.0 - 0.8 * project.ghg_intensity) * 100.0,
            threshold: 50.0,
        },
    ),
    (
        PaiMetric::FossilFuelExposure,
        Rule::Exposure(|project| project.sector.fossil_fuel_exposure),
    ),
    (
        PaiMetric::BiodiversitySensitiveAreas,
        Rule::Score {
            measure: |project, _| (1.0 - 0.5 * project.country.climate_vulnerability) * 100.0,
            threshold: 70.0,
        },
    ),
    (
        PaiMetric::EmissionsToWater,
        Rule::Score {
            measure: |project, _| (1.0 - 0.4 * project.ghg_intensity) * 100.0,
            threshold: 60.0,
        },
    ),
    (
        PaiMetric::HazardousWaste,
        Rule::Score {
            measure: |project, _| (1.0 - 0.6 * project.ghg_intensity) * 100.0,
            threshold: 55.0,
        },
    ),
    (
        PaiMetric::GenderPayGap,
        Rule::Score {
            measure: |project, _| project.gender_equality * 100.0,
            threshold: 50.0,
        },
    ),
    (
        PaiMetric::BoardGenderDiversity,
        Rule::Score {
            measure: |project, _| project.gender_equality * 90.0,
            threshold: 45.0,
        },
    ),
    (
        PaiMetric::AntiCorruption,
        Rule::Score {
            measure: |_, scores| scores.value(Dimension::Governance),
            threshold: 40.0,
        },
    ),
    (
        PaiMetric::NonCooperativeTaxJurisdiction,
        Rule::Exposure(|project| {
            !project.country.eu_member && project.country.cpi < NON_COOPERATIVE_MAX_CPI
        }),
    ),
];

/// The ten indicators for one project, in indicator-number order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaiIndicatorSet {
    indicators: Vec<PaiIndicator>,
}

impl PaiIndicatorSet {
    pub fn indicators(&self) -> &[PaiIndicator] {
        &self.indicators
    }

    pub fn get(&self, metric: PaiMetric) -> Option<&PaiIndicator> {
        self.indicators
            .iter()
            .find(|indicator| indicator.metric == metric)
    }

    pub fn adverse(&self) -> impl Iterator<Item = &PaiIndicator> + '_ {
        self.indicators.iter().filter(|indicator| indicator.adverse)
    }

    pub fn adverse_count(&self) -> usize {
        self.adverse().count()
    }

    /// Mean of all readings on the 0-100 scale, one decimal. An exposure counts as 0 when
    /// present and 100 when absent.
    pub fn summary_score(&self) -> f64 {
        if self.indicators.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .indicators
            .iter()
            .map(|indicator| match indicator.measure {
                PaiMeasure::Score(value) => value,
                PaiMeasure::Exposure(true) => 0.0,
                PaiMeasure::Exposure(false) => 100.0,
            })
            .sum();
        round1(total / self.indicators.len() as f64)
    }
}

pub fn evaluate(project: &ProjectContext, scores: &DimensionScores) -> PaiIndicatorSet {
    let indicators = INDICATORS
        .iter()
        .map(|&(metric, rule)| match rule {
            Rule::Score { measure, threshold } => {
                let value = measure(project, scores).clamp(0.0, 100.0);
                PaiIndicator {
                    metric,
                    measure: PaiMeasure::Score(value),
                    threshold: Some(threshold),
                    adverse: value < threshold,
                }
            }
            Rule::Exposure(exposed) => {
                let exposed = exposed(project);
                PaiIndicator {
                    metric,
                    measure: PaiMeasure::Exposure(exposed),
                    threshold: None,
                    adverse: exposed,
                }
            }
        })
        .collect();
    PaiIndicatorSet { indicators }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::regulatory::tests_support::project_context_for;

    #[test]
    fn produces_ten_indicators_in_number_order() {
        let set = evaluate(
            &project_context_for("Germany", "Renewable Energy", 2_000_000.0),
            &DimensionScores::uniform(70.0),
        );
        let numbers: Vec<u8> = set
            .indicators()
            .iter()
            .map(|indicator| indicator.metric.number())
            .collect();
        assert_eq!(numbers, vec![1, 2, 4, 7, 8, 9, 12, 13, 15, 16]);
    }

    #[test]
    fn clean_eu_project_has_no_adverse_indicators() {
        let set = evaluate(
            &project_context_for("Germany", "Water & Sanitation", 2_000_000.0),
            &DimensionScores::uniform(70.0),
        );
        assert_eq!(set.adverse_count(), 0);
    }

    #[test]
    fn extractive_project_in_low_cpi_country_is_flagged() {
        let set = evaluate(
            &project_context_for("Nigeria", "Extractive Industry", 2_000_000.0),
            &DimensionScores::uniform(70.0).with(Dimension::Governance, 20.0),
        );

        for metric in [
            PaiMetric::GhgEmissions,
            PaiMetric::FossilFuelExposure,
            PaiMetric::GenderPayGap,
            PaiMetric::AntiCorruption,
            PaiMetric::NonCooperativeTaxJurisdiction,
        ] {
            let indicator = set.get(metric).expect("indicator present");
            assert!(indicator.adverse, "{metric:?} should be adverse");
        }
    }

    #[test]
    fn anti_corruption_reads_governance_dimension() {
        let project = project_context_for("Germany", "Healthcare", 2_000_000.0);
        let weak = evaluate(
            &project,
            &DimensionScores::uniform(70.0).with(Dimension::Governance, 39.9),
        );
        let fine = evaluate(
            &project,
            &DimensionScores::uniform(70.0).with(Dimension::Governance, 40.0),
        );
        assert!(weak.get(PaiMetric::AntiCorruption).is_some_and(|i| i.adverse));
        assert!(fine.get(PaiMetric::AntiCorruption).is_some_and(|i| !i.adverse));
    }

    #[test]
    fn summary_counts_exposures_as_binary_scores() {
        let set = PaiIndicatorSet {
            indicators: vec![
                PaiIndicator {
                    metric: PaiMetric::GhgEmissions,
                    measure: PaiMeasure::Score(80.0),
                    threshold: Some(50.0),
                    adverse: false,
                },
                PaiIndicator {
                    metric: PaiMetric::FossilFuelExposure,
                    measure: PaiMeasure::Exposure(true),
                    threshold: None,
                    adverse: true,
                },
            ],
        };
        assert_eq!(set.summary_score(), 40.0);
    }
}
