//! Regulatory gate evaluation across the five EU sustainable-finance frameworks.
//!
//! Each framework evaluator is a pure function of a read-only [`GateContext`] and the
//! configured [`FrameworkCriteria`]; none of them reads another framework's result, so the
//! evaluation order never changes the outcome.

mod criteria;
mod csrd;
mod mifid;
mod sfdr;
mod taxonomy;
mod tcfd;

pub use criteria::{
    CsrdCriteria, FrameworkCriteria, MifidCriteria, SfdrCriteria, SfdrRule, SfdrTable,
    TaxonomyCriteria, TcfdCriteria,
};
pub use mifid::InvestorProfile;
pub use sfdr::{article_for, SfdrArticle};
pub use tcfd::risk_levels;

use serde::{Deserialize, Serialize};

use super::aggregate::{round1, CompositeScore};
use super::domain::{Band, DimensionScores, RiskLevel};
use super::normalizer::ProjectContext;
use super::veto::VetoFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    EuTaxonomy,
    Sfdr,
    Csrd,
    Tcfd,
    MifidII,
}

impl Framework {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::EuTaxonomy,
            Self::Sfdr,
            Self::Csrd,
            Self::Tcfd,
            Self::MifidII,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::EuTaxonomy => "eu_taxonomy",
            Self::Sfdr => "sfdr",
            Self::Csrd => "csrd",
            Self::Tcfd => "tcfd",
            Self::MifidII => "mifid_ii",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EuTaxonomy => "EU Taxonomy",
            Self::Sfdr => "SFDR",
            Self::Csrd => "CSRD/ESRS",
            Self::Tcfd => "TCFD",
            Self::MifidII => "MiFID II",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Pass,
    Partial,
    Fail,
}

impl GateOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Partial => "partial",
            Self::Fail => "fail",
        }
    }

    /// All criteria pass: Pass. A mandatory criterion fails, or every criterion fails: Fail.
    /// Anything in between: Partial.
    pub fn from_criteria(criteria: &[Criterion]) -> Self {
        if criteria.iter().all(|criterion| criterion.passed) {
            GateOutcome::Pass
        } else if criteria
            .iter()
            .any(|criterion| criterion.mandatory && !criterion.passed)
            || criteria.iter().all(|criterion| !criterion.passed)
        {
            GateOutcome::Fail
        } else {
            GateOutcome::Partial
        }
    }
}

/// One evaluated sub-criterion, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub key: String,
    pub passed: bool,
    pub mandatory: bool,
    pub detail: String,
}

impl Criterion {
    pub(crate) fn new(key: &str, passed: bool, detail: String) -> Self {
        Self {
            key: key.to_string(),
            passed,
            mandatory: false,
            detail,
        }
    }

    pub(crate) fn mandatory(key: &str, passed: bool, detail: String) -> Self {
        Self {
            mandatory: true,
            ..Self::new(key, passed, detail)
        }
    }
}

/// Framework-specific figures reported alongside the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "framework", rename_all = "snake_case")]
pub enum FrameworkDetail {
    EuTaxonomy {
        eligible: bool,
        aligned: bool,
        dnsh_pass: bool,
        substantial_contribution_pct: f64,
    },
    Sfdr {
        article: SfdrArticle,
    },
    Csrd {
        in_scope: bool,
        scope_proxied: bool,
        impact_material: bool,
        financial_material: bool,
    },
    Tcfd {
        physical_risk: RiskLevel,
        transition_risk: RiskLevel,
    },
    MifidII {
        suitability: f64,
        profile: InvestorProfile,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkGate {
    pub framework: Framework,
    pub outcome: GateOutcome,
    pub criteria: Vec<Criterion>,
    pub detail: FrameworkDetail,
}

/// Read-only inputs shared by every framework evaluator.
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub scores: &'a DimensionScores,
    pub composite: CompositeScore,
    pub veto: &'a VetoFlag,
    pub band: Band,
    pub project: &'a ProjectContext,
}

pub fn evaluate_framework(
    framework: Framework,
    context: &GateContext<'_>,
    criteria: &FrameworkCriteria,
) -> FrameworkGate {
    match framework {
        Framework::EuTaxonomy => taxonomy::evaluate(context, criteria),
        Framework::Sfdr => sfdr::evaluate(context, criteria),
        Framework::Csrd => csrd::evaluate(context, criteria),
        Framework::Tcfd => tcfd::evaluate(context, criteria),
        Framework::MifidII => mifid::evaluate(context, criteria),
    }
}

/// Evaluate all five frameworks; gates are returned in canonical framework order.
pub fn evaluate_all(
    context: &GateContext<'_>,
    criteria: &FrameworkCriteria,
) -> RegulatoryGateResult {
    let gates = Framework::ordered()
        .into_iter()
        .map(|framework| evaluate_framework(framework, context, criteria))
        .collect();
    RegulatoryGateResult { gates }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryGateResult {
    gates: Vec<FrameworkGate>,
}

impl RegulatoryGateResult {
    /// Assemble from individually evaluated gates, restoring canonical order.
    pub fn from_gates(mut gates: Vec<FrameworkGate>) -> Self {
        gates.sort_by_key(|gate| gate.framework);
        Self { gates }
    }

    pub fn gates(&self) -> &[FrameworkGate] {
        &self.gates
    }

    pub fn get(&self, framework: Framework) -> Option<&FrameworkGate> {
        self.gates.iter().find(|gate| gate.framework == framework)
    }

    pub fn outcome(&self, framework: Framework) -> Option<GateOutcome> {
        self.get(framework).map(|gate| gate.outcome)
    }

    pub fn sfdr_article(&self) -> Option<SfdrArticle> {
        self.gates.iter().find_map(|gate| match gate.detail {
            FrameworkDetail::Sfdr { article } => Some(article),
            _ => None,
        })
    }

    pub fn taxonomy_aligned(&self) -> bool {
        self.gates.iter().any(|gate| {
            matches!(
                gate.detail,
                FrameworkDetail::EuTaxonomy { aligned: true, .. }
            )
        })
    }

    pub fn tcfd_risks(&self) -> Option<(RiskLevel, RiskLevel)> {
        self.gates.iter().find_map(|gate| match gate.detail {
            FrameworkDetail::Tcfd {
                physical_risk,
                transition_risk,
            } => Some((physical_risk, transition_risk)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = &FrameworkGate> + '_ {
        self.gates
            .iter()
            .filter(|gate| gate.outcome == GateOutcome::Fail)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(passed: bool, mandatory: bool) -> Criterion {
        Criterion {
            key: "c".to_string(),
            passed,
            mandatory,
            detail: String::new(),
        }
    }

    #[test]
    fn outcome_from_criteria_table() {
        assert_eq!(
            GateOutcome::from_criteria(&[criterion(true, true), criterion(true, false)]),
            GateOutcome::Pass
        );
        assert_eq!(
            GateOutcome::from_criteria(&[criterion(true, true), criterion(false, false)]),
            GateOutcome::Partial
        );
        assert_eq!(
            GateOutcome::from_criteria(&[criterion(false, true), criterion(true, false)]),
            GateOutcome::Fail
        );
        assert_eq!(
            GateOutcome::from_criteria(&[criterion(false, false), criterion(false, false)]),
            GateOutcome::Fail
        );
    }
}
