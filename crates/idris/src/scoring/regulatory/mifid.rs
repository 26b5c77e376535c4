use serde::{Deserialize, Serialize};

use super::{
    article_for, risk_levels, round1, Criterion, Framework, FrameworkCriteria, FrameworkDetail,
    FrameworkGate, GateContext, GateOutcome, MifidCriteria, SfdrArticle,
};
use crate::scoring::domain::RiskLevel;

/// Investor sustainability-preference profile a project is suitable for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorProfile {
    SustainabilityFocused,
    EsgIntegrated,
    Conventional,
}

impl InvestorProfile {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SustainabilityFocused => "Sustainability-focused (Article 9 preference)",
            Self::EsgIntegrated => "ESG-integrated (Article 8 preference)",
            Self::Conventional => "Conventional (Article 6 compatible)",
        }
    }
}

fn uplift(article: SfdrArticle, criteria: &MifidCriteria) -> f64 {
    match article {
        SfdrArticle::Article9 => criteria.article9_uplift,
        SfdrArticle::Article8Plus => criteria.article8_plus_uplift,
        SfdrArticle::Article8 => criteria.article8_uplift,
        SfdrArticle::Article6 => 0.0,
    }
}

/// Suitability on a 0-10 scale, one decimal.
pub(super) fn suitability(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> f64 {
    let mifid = &criteria.mifid;
    let article = article_for(context, &criteria.sfdr);
    let (physical, transition) = risk_levels(context, &criteria.tcfd);

    let mut score = (context.composite.value() / 10.0 + uplift(article, mifid)).min(10.0);
    if physical == RiskLevel::High || transition == RiskLevel::High {
        score = (score - mifid.high_risk_penalty).max(0.0);
    }
    round1(score)
}

pub(super) fn evaluate(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> FrameworkGate {
    let mifid = &criteria.mifid;
    let score = suitability(context, criteria);

    let (outcome, profile) = if score >= mifid.pass_threshold {
        (GateOutcome::Pass, InvestorProfile::SustainabilityFocused)
    } else if score >= mifid.partial_threshold {
        (GateOutcome::Partial, InvestorProfile::EsgIntegrated)
    } else {
        (GateOutcome::Fail, InvestorProfile::Conventional)
    };

    FrameworkGate {
        framework: Framework::MifidII,
        outcome,
        criteria: vec![
            Criterion::new(
                "sustainability_preference",
                score >= mifid.pass_threshold,
                format!(
                    "suitability {score:.1} against {:.1} for sustainability-focused clients",
                    mifid.pass_threshold
                ),
            ),
            Criterion::new(
                "esg_integration",
                score >= mifid.partial_threshold,
                format!(
                    "suitability {score:.1} against {:.1} for ESG-integrated clients",
                    mifid.partial_threshold
                ),
            ),
        ],
        detail: FrameworkDetail::MifidII {
            suitability: score,
            profile,
        },
    }
}
