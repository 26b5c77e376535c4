use super::{
    Criterion, Framework, FrameworkCriteria, FrameworkDetail, FrameworkGate, GateContext,
    GateOutcome,
};
use crate::scoring::domain::Dimension;

/// CSRD/ESRS: scope determination, then disclosure readiness under double materiality.
pub(super) fn evaluate(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> FrameworkGate {
    let csrd = &criteria.csrd;
    let project = context.project;

    let (in_scope, scope_proxied) = match project.csrd_in_scope {
        Some(flag) => (flag, false),
        None => (
            project.investment_eur > csrd.min_investment_eur
                && project.country.eu_member
                && !project.sector.csrd_exempt,
            true,
        ),
    };
    let impact_material = project.sector.impact_material;
    let financial_material =
        project.country.eu_member && project.size_factor > csrd.financial_materiality_min_size;

    let evaluated = if in_scope {
        let governance = context.scores.value(Dimension::Governance);
        let climate = context.scores.value(Dimension::Climate);
        let pollution = context.scores.value(Dimension::Pollution);
        let impact_covered =
            !impact_material || (climate >= csrd.min_climate && pollution >= csrd.min_pollution);

        vec![
            Criterion::mandatory(
                "disclosure_governance",
                governance >= csrd.min_governance,
                format!(
                    "governance {governance:.1} against a floor of {:.0}",
                    csrd.min_governance
                ),
            ),
            Criterion::new(
                "impact_materiality_covered",
                impact_covered,
                if impact_material {
                    format!(
                        "climate {climate:.1} (min {:.0}), pollution {pollution:.1} (min {:.0})",
                        csrd.min_climate, csrd.min_pollution
                    )
                } else {
                    "sector is not impact-material".to_string()
                },
            ),
        ]
    } else {
        vec![Criterion::new(
            "not_in_scope",
            true,
            if scope_proxied {
                "below the reporting thresholds".to_string()
            } else {
                "reported as out of scope".to_string()
            },
        )]
    };

    FrameworkGate {
        framework: Framework::Csrd,
        outcome: GateOutcome::from_criteria(&evaluated),
        criteria: evaluated,
        detail: FrameworkDetail::Csrd {
            in_scope,
            scope_proxied,
            impact_material,
            financial_material,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::aggregate::CompositeScore;
    use crate::scoring::domain::{Band, DimensionScores};
    use crate::scoring::normalizer::ProjectContext;
    use crate::scoring::regulatory::tests_support::project_context_for;
    use crate::scoring::veto::VetoFlag;

    fn gate(project: &ProjectContext, scores: DimensionScores) -> FrameworkGate {
        let veto = VetoFlag::default();
        let context = GateContext {
            scores: &scores,
            composite: CompositeScore::new(60.0),
            veto: &veto,
            band: Band::Green,
            project,
        };
        evaluate(&context, &FrameworkCriteria::default())
    }

    #[test]
    fn small_ticket_is_out_of_scope_and_passes() {
        let project = project_context_for("France", "Renewable Energy", 1_000_000.0);
        let gate = gate(&project, DimensionScores::uniform(10.0));
        assert_eq!(gate.outcome, GateOutcome::Pass);
        assert_eq!(gate.criteria[0].key, "not_in_scope");
    }

    #[test]
    fn exempt_sector_stays_out_of_scope() {
        let project = project_context_for("France", "Microfinance", 20_000_000.0);
        let gate = gate(&project, DimensionScores::uniform(10.0));
        assert!(matches!(
            gate.detail,
            FrameworkDetail::Csrd {
                in_scope: false,
                scope_proxied: true,
                ..
            }
        ));
    }

    #[test]
    fn weak_governance_fails_in_scope_project() {
        let project = project_context_for("France", "Renewable Energy", 20_000_000.0);
        let scores = DimensionScores::uniform(80.0).with(Dimension::Governance, 40.0);
        assert_eq!(gate(&project, scores).outcome, GateOutcome::Fail);
    }

    #[test]
    fn impact_material_sector_needs_environmental_coverage() {
        let project = project_context_for("France", "Renewable Energy", 20_000_000.0);
        let scores = DimensionScores::uniform(80.0).with(Dimension::Pollution, 30.0);
        assert_eq!(gate(&project, scores).outcome, GateOutcome::Partial);
    }

    #[test]
    fn reported_scope_flag_overrides_proxy() {
        let mut project = project_context_for("Kenya", "Healthcare", 1_000_000.0);
        project.csrd_in_scope = Some(true);
        let gate = gate(&project, DimensionScores::uniform(70.0));
        assert!(matches!(
            gate.detail,
            FrameworkDetail::Csrd {
                in_scope: true,
                scope_proxied: false,
                ..
            }
        ));
        assert_eq!(gate.outcome, GateOutcome::Pass);
    }
}
