//! Due-diligence warnings and strengths.
//!
//! Flags are derived from already computed results and never feed back into the band or
//! the gates.

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, DimensionScores, RiskLevel};
use super::regulatory::{RegulatoryGateResult, SfdrArticle};
use super::veto::VetoFlag;

const LOW_SCORE: f64 = 30.0;
const GOVERNANCE_RISK: f64 = 40.0;
const CLIMATE_BELOW_AVERAGE: f64 = 45.0;
const GENDER_LOW: f64 = 40.0;
const POLLUTION_HARM: f64 = 40.0;
const STRONG_SCORE: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Warning,
    Strength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDiligenceFlag {
    pub kind: FlagKind,
    pub code: String,
    pub message: String,
}

impl DueDiligenceFlag {
    fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FlagKind::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    fn strength(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FlagKind::Strength,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Warnings first (veto warnings leading), then strengths.
pub fn generate(
    scores: &DimensionScores,
    veto: &VetoFlag,
    veto_threshold: f64,
    gates: &RegulatoryGateResult,
) -> Vec<DueDiligenceFlag> {
    let mut flags = Vec::new();

    for dimension in &veto.triggered_by {
        flags.push(DueDiligenceFlag::warning(
            format!("social_veto.{}", dimension.key()),
            format!(
                "Social veto triggered: {} score ({:.0}/100) is below the {:.0}-point floor. Band capped at Amber.",
                dimension.label(),
                scores.value(*dimension),
                veto_threshold
            ),
        ));
    }

    for (dimension, score) in scores.iter() {
        if !veto.triggered_by.contains(&dimension) && score.value < LOW_SCORE {
            flags.push(DueDiligenceFlag::warning(
                format!("low_score.{}", dimension.key()),
                format!(
                    "{} score ({:.0}/100) is critically low.",
                    dimension.label(),
                    score.value
                ),
            ));
        }
    }

    let value = |dimension: Dimension| scores.value(dimension);
    if value(Dimension::Governance) < GOVERNANCE_RISK {
        flags.push(DueDiligenceFlag::warning(
            "governance_risk",
            "Governance score below threshold: high corruption risk in the country of operation.",
        ));
    }
    if value(Dimension::Climate) < CLIMATE_BELOW_AVERAGE {
        flags.push(DueDiligenceFlag::warning(
            "climate_below_average",
            "Climate score below sector average: review GHG intensity and taxonomy eligibility.",
        ));
    }
    if value(Dimension::Gender) < GENDER_LOW {
        flags.push(DueDiligenceFlag::warning(
            "gender_equity_low",
            "Gender equity score is low: PAI 12 (gender pay gap) likely adverse.",
        ));
    }
    if value(Dimension::Pollution) < POLLUTION_HARM {
        flags.push(DueDiligenceFlag::warning(
            "pollution_harm",
            "Pollution score indicates significant environmental harm: DNSH risk.",
        ));
    }

    for gate in gates.failed() {
        flags.push(DueDiligenceFlag::warning(
            format!("gate_failed.{}", gate.framework.key()),
            format!("{} gate failed.", gate.framework.label()),
        ));
    }

    if let Some((physical, transition)) = gates.tcfd_risks() {
        if physical == RiskLevel::High {
            flags.push(DueDiligenceFlag::warning(
                "tcfd_physical_risk",
                "TCFD: high physical climate risk; the asset may be stranded under 1.5-2°C scenarios.",
            ));
        }
        if transition == RiskLevel::High {
            flags.push(DueDiligenceFlag::warning(
                "tcfd_transition_risk",
                "TCFD: high transition risk; the sector faces significant regulatory or market disruption.",
            ));
        }
    }

    if gates.taxonomy_aligned() {
        flags.push(DueDiligenceFlag::strength(
            "taxonomy_aligned",
            "EU Taxonomy aligned.",
        ));
    }
    match gates.sfdr_article() {
        Some(SfdrArticle::Article9) => flags.push(DueDiligenceFlag::strength(
            "sfdr_article_9",
            "Qualifies as an Article 9 sustainable investment under SFDR.",
        )),
        Some(SfdrArticle::Article8Plus) => flags.push(DueDiligenceFlag::strength(
            "sfdr_article_8_plus",
            "Promotes E/S characteristics with partial sustainable investments: Article 8+ under SFDR.",
        )),
        Some(SfdrArticle::Article8) => flags.push(DueDiligenceFlag::strength(
            "sfdr_article_8",
            "Promotes E/S characteristics: classifiable as Article 8 under SFDR.",
        )),
        Some(SfdrArticle::Article6) | None => {}
    }

    for (dimension, code, message) in [
        (
            Dimension::Climate,
            "strong_climate",
            "Strong climate contribution: significant GHG avoidance or clean energy generation.",
        ),
        (
            Dimension::SocialMobility,
            "strong_social",
            "High social impact: supports employment, skills and local economic development.",
        ),
        (
            Dimension::Governance,
            "strong_governance",
            "Strong governance framework: low corruption exposure and robust transparency.",
        ),
    ] {
        if value(dimension) >= STRONG_SCORE {
            flags.push(DueDiligenceFlag::strength(code, message));
        }
    }

    flags
}

pub fn warnings(flags: &[DueDiligenceFlag]) -> impl Iterator<Item = &DueDiligenceFlag> + '_ {
    flags.iter().filter(|flag| flag.kind == FlagKind::Warning)
}

pub fn strengths(flags: &[DueDiligenceFlag]) -> impl Iterator<Item = &DueDiligenceFlag> + '_ {
    flags.iter().filter(|flag| flag.kind == FlagKind::Strength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::aggregate::{composite, WeightTable};
    use crate::scoring::domain::Band;
    use crate::scoring::regulatory::{evaluate_all, FrameworkCriteria, GateContext};
    use crate::scoring::regulatory::tests_support::project_context_for;
    use crate::scoring::veto::VetoPolicy;

    fn flags_for(scores: DimensionScores, veto: VetoFlag, band: Band) -> Vec<DueDiligenceFlag> {
        flags_with_threshold(scores, veto, band, 30.0)
    }

    fn flags_with_threshold(
        scores: DimensionScores,
        veto: VetoFlag,
        band: Band,
        threshold: f64,
    ) -> Vec<DueDiligenceFlag> {
        let project = project_context_for("Germany", "Renewable Energy", 2_000_000.0);
        let context = GateContext {
            scores: &scores,
            composite: composite(&scores, &WeightTable::default()),
            veto: &veto,
            band,
            project: &project,
        };
        let gates = evaluate_all(&context, &FrameworkCriteria::default());
        generate(&scores, &veto, threshold, &gates)
    }

    #[test]
    fn veto_warnings_come_first() {
        let scores = DimensionScores::uniform(20.0);
        let veto = VetoFlag {
            triggered_by: vec![Dimension::Gender, Dimension::SocialMobility],
        };
        let flags = flags_for(scores, veto, Band::Red);

        assert_eq!(flags[0].code, "social_veto.gender");
        assert_eq!(flags[1].code, "social_veto.social");
        assert!(flags.iter().any(|flag| flag.code == "low_score.climate"));
        assert!(flags.iter().all(|flag| flag.code != "low_score.gender"));
    }

    #[test]
    fn strong_project_lists_strengths_only() {
        let flags = flags_for(DimensionScores::uniform(80.0), VetoFlag::default(), Band::DarkGreen);

        assert_eq!(warnings(&flags).count(), 0);
        let codes: Vec<&str> = strengths(&flags).map(|flag| flag.code.as_str()).collect();
        assert!(codes.contains(&"taxonomy_aligned"));
        assert!(codes.contains(&"sfdr_article_9"));
        assert!(codes.contains(&"strong_climate"));
        assert!(codes.contains(&"strong_governance"));
    }

    #[test]
    fn failed_gates_are_reported() {
        let scores = DimensionScores::uniform(30.0);
        let flags = flags_for(scores, VetoFlag::default(), Band::Red);
        assert!(flags.iter().any(|flag| flag.code == "gate_failed.sfdr"));
        assert!(flags.iter().any(|flag| flag.code == "gate_failed.mifid_ii"));
    }

    #[test]
    fn lowered_veto_threshold_still_warns_on_low_social_scores() {
        let scores = DimensionScores::uniform(70.0).with(Dimension::SocialMobility, 25.0);
        let veto = VetoPolicy { threshold: 20.0 }.evaluate(&scores);
        assert!(!veto.is_triggered());

        let flags = flags_with_threshold(scores, veto, Band::Green, 20.0);
        assert!(flags.iter().any(|flag| flag.code == "low_score.social"));
        assert!(flags.iter().all(|flag| !flag.code.starts_with("social_veto")));
    }
}
