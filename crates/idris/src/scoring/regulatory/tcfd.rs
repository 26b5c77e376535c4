use super::{
    Criterion, Framework, FrameworkCriteria, FrameworkDetail, FrameworkGate, GateContext,
    GateOutcome, TcfdCriteria,
};
use crate::scoring::domain::RiskLevel;

/// Physical risk from country vulnerability, transition risk from the sector table.
pub fn risk_levels(context: &GateContext<'_>, criteria: &TcfdCriteria) -> (RiskLevel, RiskLevel) {
    let vulnerability = context.project.country.climate_vulnerability;
    let physical = if vulnerability > criteria.high_vulnerability {
        RiskLevel::High
    } else if vulnerability > criteria.medium_vulnerability {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    (physical, context.project.sector.transition_risk)
}

pub(super) fn evaluate(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> FrameworkGate {
    let (physical_risk, transition_risk) = risk_levels(context, &criteria.tcfd);

    let evaluated = vec![
        Criterion::new(
            "physical_risk_managed",
            physical_risk != RiskLevel::High,
            format!(
                "{} physical risk at climate vulnerability {:.2}",
                physical_risk.label(),
                context.project.country.climate_vulnerability
            ),
        ),
        Criterion::new(
            "transition_risk_managed",
            transition_risk != RiskLevel::High,
            format!("{} sector transition risk", transition_risk.label()),
        ),
    ];

    FrameworkGate {
        framework: Framework::Tcfd,
        outcome: GateOutcome::from_criteria(&evaluated),
        criteria: evaluated,
        detail: FrameworkDetail::Tcfd {
            physical_risk,
            transition_risk,
        },
    }
}
