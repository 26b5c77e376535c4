use super::{
    round1, Criterion, Framework, FrameworkCriteria, FrameworkDetail, FrameworkGate, GateContext,
    GateOutcome,
};

/// EU Taxonomy: eligibility, substantial contribution and do-no-significant-harm.
pub(super) fn evaluate(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> FrameworkGate {
    let taxonomy = &criteria.taxonomy;
    let project = context.project;
    let eligible = project.taxonomy_eligible;

    let contribution = ((1.0 - project.ghg_intensity) * taxonomy.ghg_weight
        + (context.composite.value() / 100.0) * (1.0 - taxonomy.ghg_weight))
        .clamp(0.0, 1.0);
    let contributes = contribution > taxonomy.min_substantial_contribution;
    let dnsh_pass = project.ghg_intensity < taxonomy.dnsh_max_ghg
        && project.country.climate_vulnerability < taxonomy.dnsh_max_vulnerability;

    let evaluated = vec![
        Criterion::mandatory(
            "eligible",
            eligible,
            if eligible {
                "activity is taxonomy-eligible".to_string()
            } else {
                "activity is not covered by the taxonomy".to_string()
            },
        ),
        Criterion::new(
            "substantial_contribution",
            eligible && contributes,
            format!(
                "contribution {:.1}% against a minimum of {:.0}%",
                contribution * 100.0,
                taxonomy.min_substantial_contribution * 100.0
            ),
        ),
        Criterion::new(
            "dnsh",
            eligible && dnsh_pass,
            format!(
                "ghg intensity {:.2} (max {:.2}), climate vulnerability {:.2} (max {:.2})",
                project.ghg_intensity,
                taxonomy.dnsh_max_ghg,
                project.country.climate_vulnerability,
                taxonomy.dnsh_max_vulnerability
            ),
        ),
    ];

    let outcome = GateOutcome::from_criteria(&evaluated);
    FrameworkGate {
        framework: Framework::EuTaxonomy,
        outcome,
        criteria: evaluated,
        detail: FrameworkDetail::EuTaxonomy {
            eligible,
            aligned: outcome == GateOutcome::Pass,
            dnsh_pass: eligible && dnsh_pass,
            substantial_contribution_pct: if eligible {
                round1(contribution * 100.0)
            } else {
                0.0
            },
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

    fn gate(project: &ProjectContext, composite: f64) -> FrameworkGate {
        let scores = DimensionScores::uniform(composite);
        let veto = VetoFlag::default();
        let context = GateContext {
            scores: &scores,
            composite: CompositeScore::new(composite),
            veto: &veto,
            band: Band::Green,
            project,
        };
        evaluate(&context, &FrameworkCriteria::default())
    }

    #[test]
    fn low_carbon_eligible_activity_is_aligned() {
        let project = project_context_for("Germany", "Renewable Energy", 2_000_000.0);
        let gate = gate(&project, 70.0);

        assert_eq!(gate.outcome, GateOutcome::Pass);
        match gate.detail {
            FrameworkDetail::EuTaxonomy {
                aligned,
                substantial_contribution_pct,
                ..
            } => {
                assert!(aligned);
                // (1 - 0.05) * 0.6 + 0.70 * 0.4
                assert!((substantial_contribution_pct - 85.0).abs() < 1e-9);
            }
            other => panic!("expected taxonomy detail, got {other:?}"),
        }
    }

    #[test]
    fn ineligible_activity_fails() {
        let project = project_context_for("Germany", "Healthcare", 2_000_000.0);
        let gate = gate(&project, 90.0);
        assert_eq!(gate.outcome, GateOutcome::Fail);
        assert!(matches!(
            gate.detail,
            FrameworkDetail::EuTaxonomy {
                eligible: false,
                aligned: false,
                ..
            }
        ));
    }

    #[test]
    fn vulnerable_country_fails_dnsh_only() {
        let project = project_context_for("Nigeria", "Renewable Energy", 2_000_000.0);
        let gate = gate(&project, 70.0);

        assert_eq!(gate.outcome, GateOutcome::Partial);
        let dnsh = gate
            .criteria
            .iter()
            .find(|criterion| criterion.key == "dnsh")
            .expect("dnsh criterion");
        assert!(!dnsh.passed);
    }
}
