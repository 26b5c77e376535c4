use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Criterion, Framework, FrameworkCriteria, FrameworkDetail, FrameworkGate, GateContext,
    GateOutcome, SfdrCriteria,
};
use crate::scoring::domain::Dimension;

/// SFDR product classification, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SfdrArticle {
    #[serde(rename = "article_6")]
    Article6,
    #[serde(rename = "article_8")]
    Article8,
    #[serde(rename = "article_8_plus")]
    Article8Plus,
    #[serde(rename = "article_9")]
    Article9,
}

impl SfdrArticle {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Article6 => "Article 6",
            Self::Article8 => "Article 8",
            Self::Article8Plus => "Article 8+",
            Self::Article9 => "Article 9",
        }
    }

    const fn outcome(self) -> GateOutcome {
        match self {
            Self::Article9 | Self::Article8Plus => GateOutcome::Pass,
            Self::Article8 => GateOutcome::Partial,
            Self::Article6 => GateOutcome::Fail,
        }
    }
}

impl fmt::Display for SfdrArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Article for the effective band. Rows with a fallback drop to it when the governance
/// floor is missed or the social veto fired.
pub fn article_for(context: &GateContext<'_>, criteria: &SfdrCriteria) -> SfdrArticle {
    let Some(rule) = criteria.table.rule(context.band) else {
        return SfdrArticle::Article6;
    };
    match rule.fallback {
        Some(fallback) if !meets_fallback_conditions(context, criteria) => fallback,
        _ => rule.article,
    }
}

fn meets_fallback_conditions(context: &GateContext<'_>, criteria: &SfdrCriteria) -> bool {
    context.scores.value(Dimension::Governance) >= criteria.article8_min_governance
        && !context.veto.is_triggered()
}

pub(super) fn evaluate(context: &GateContext<'_>, criteria: &FrameworkCriteria) -> FrameworkGate {
    let sfdr = &criteria.sfdr;
    let article = article_for(context, sfdr);
    let governance = context.scores.value(Dimension::Governance);

    let mut evaluated = vec![Criterion::new(
        "band_mapping",
        article >= SfdrArticle::Article8,
        format!("{} band maps to {}", context.band, article),
    )];
    if sfdr
        .table
        .rule(context.band)
        .is_some_and(|rule| rule.fallback.is_some())
    {
        evaluated.push(Criterion::new(
            "governance_floor",
            governance >= sfdr.article8_min_governance,
            format!(
                "governance {governance:.1} against a floor of {:.0}",
                sfdr.article8_min_governance
            ),
        ));
        evaluated.push(Criterion::new(
            "social_veto_clear",
            !context.veto.is_triggered(),
            if context.veto.is_triggered() {
                "social veto triggered".to_string()
            } else {
                "no social veto".to_string()
            },
        ));
    }

    FrameworkGate {
        framework: Framework::Sfdr,
        outcome: article.outcome(),
        criteria: evaluated,
        detail: FrameworkDetail::Sfdr { article },
    }
}
