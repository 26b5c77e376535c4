use serde::{Deserialize, Serialize};

use super::sfdr::SfdrArticle;
use crate::scoring::domain::Band;

/// Thresholds for every framework gate, loaded once with the engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkCriteria {
    pub taxonomy: TaxonomyCriteria,
    pub sfdr: SfdrCriteria,
    pub csrd: CsrdCriteria,
    pub tcfd: TcfdCriteria,
    pub mifid: MifidCriteria,
}

impl FrameworkCriteria {
    pub fn validate(&self) -> Result<(), String> {
        self.taxonomy.validate()?;
        self.sfdr.validate()?;
        self.csrd.validate()?;
        self.tcfd.validate()?;
        self.mifid.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyCriteria {
    /// DNSH climate mitigation: GHG intensity must stay below this.
    pub dnsh_max_ghg: f64,
    /// DNSH climate adaptation: country vulnerability must stay below this.
    pub dnsh_max_vulnerability: f64,
    pub min_substantial_contribution: f64,
    /// Share of the substantial-contribution score driven by GHG intensity; the
    /// remainder comes from the composite.
    pub ghg_weight: f64,
}

impl Default for TaxonomyCriteria {
    fn default() -> Self {
        Self {
            dnsh_max_ghg: 0.50,
            dnsh_max_vulnerability: 0.70,
            min_substantial_contribution: 0.40,
            ghg_weight: 0.60,
        }
    }
}

impl TaxonomyCriteria {
    fn validate(&self) -> Result<(), String> {
        fraction("frameworks.taxonomy.dnsh_max_ghg", self.dnsh_max_ghg)?;
        fraction(
            "frameworks.taxonomy.dnsh_max_vulnerability",
            self.dnsh_max_vulnerability,
        )?;
        fraction(
            "frameworks.taxonomy.min_substantial_contribution",
            self.min_substantial_contribution,
        )?;
        fraction("frameworks.taxonomy.ghg_weight", self.ghg_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SfdrCriteria {
    pub table: SfdrTable,
    /// Governance needed for a band with a fallback row to keep its primary article.
    pub article8_min_governance: f64,
}

impl Default for SfdrCriteria {
    fn default() -> Self {
        Self {
            table: SfdrTable::default(),
            article8_min_governance: 50.0,
        }
    }
}

impl SfdrCriteria {
    fn validate(&self) -> Result<(), String> {
        score(
            "frameworks.sfdr.article8_min_governance",
            self.article8_min_governance,
        )?;
        self.table.validate()
    }
}

/// One row of the band to SFDR article lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfdrRule {
    pub band: Band,
    pub article: SfdrArticle,
    /// Article used instead when the governance floor is missed or the veto fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SfdrArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SfdrTable {
    rules: Vec<SfdrRule>,
}

impl Default for SfdrTable {
    fn default() -> Self {
        Self {
            rules: vec![
                SfdrRule {
                    band: Band::Red,
                    article: SfdrArticle::Article6,
                    fallback: None,
                },
                SfdrRule {
                    band: Band::Amber,
                    article: SfdrArticle::Article8,
                    fallback: Some(SfdrArticle::Article6),
                },
                SfdrRule {
                    band: Band::Green,
                    article: SfdrArticle::Article8Plus,
                    fallback: None,
                },
                SfdrRule {
                    band: Band::DarkGreen,
                    article: SfdrArticle::Article9,
                    fallback: None,
                },
            ],
        }
    }
}

impl SfdrTable {
    pub fn new(rules: Vec<SfdrRule>) -> Result<Self, String> {
        let table = Self { rules };
        table.validate()?;
        Ok(table)
    }

    pub fn rules(&self) -> &[SfdrRule] {
        &self.rules
    }

    pub fn rule(&self, band: Band) -> Option<&SfdrRule> {
        self.rules.iter().find(|rule| rule.band == band)
    }

    /// One row per band in band order; the extremes are pinned to Article 9 and Article 6
    /// and a better band never maps to a weaker article.
    pub fn validate(&self) -> Result<(), String> {
        let bands: Vec<Band> = self.rules.iter().map(|rule| rule.band).collect();
        if bands != Band::ordered() {
            return Err(format!(
                "frameworks.sfdr.table must list red, amber, green, dark_green in order, found {bands:?}"
            ));
        }

        for rule in &self.rules {
            if let Some(fallback) = rule.fallback {
                if fallback > rule.article {
                    return Err(format!(
                        "frameworks.sfdr.table.{}: fallback {} is stronger than {}",
                        rule.band.key(),
                        fallback.label(),
                        rule.article.label()
                    ));
                }
            }
        }

        for (band, article) in [
            (Band::Red, SfdrArticle::Article6),
            (Band::DarkGreen, SfdrArticle::Article9),
        ] {
            match self.rule(band) {
                Some(rule) if rule.article == article && rule.fallback.is_none() => {}
                _ => {
                    return Err(format!(
                        "frameworks.sfdr.table.{}: must map to {} without a fallback",
                        band.key(),
                        article.label()
                    ))
                }
            }
        }

        if self
            .rules
            .windows(2)
            .any(|pair| pair[1].article < pair[0].article)
        {
            return Err(
                "frameworks.sfdr.table: articles must not weaken as bands improve".to_string(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrdCriteria {
    /// Scope proxy: investment strictly above this amount.
    pub min_investment_eur: f64,
    pub min_governance: f64,
    pub min_climate: f64,
    pub min_pollution: f64,
    /// Financial materiality: EU member with a size factor above this.
    pub financial_materiality_min_size: f64,
}

impl Default for CsrdCriteria {
    fn default() -> Self {
        Self {
            min_investment_eur: 5_000_000.0,
            min_governance: 50.0,
            min_climate: 45.0,
            min_pollution: 40.0,
            financial_materiality_min_size: 0.60,
        }
    }
}

impl CsrdCriteria {
    fn validate(&self) -> Result<(), String> {
        if !self.min_investment_eur.is_finite() || self.min_investment_eur < 0.0 {
            return Err(format!(
                "frameworks.csrd.min_investment_eur: {} must be a non-negative amount",
                self.min_investment_eur
            ));
        }
        score("frameworks.csrd.min_governance", self.min_governance)?;
        score("frameworks.csrd.min_climate", self.min_climate)?;
        score("frameworks.csrd.min_pollution", self.min_pollution)?;
        fraction(
            "frameworks.csrd.financial_materiality_min_size",
            self.financial_materiality_min_size,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcfdCriteria {
    /// Vulnerability strictly above this is Medium physical risk.
    pub medium_vulnerability: f64,
    /// Vulnerability strictly above this is High physical risk.
    pub high_vulnerability: f64,
}

impl Default for TcfdCriteria {
    fn default() -> Self {
        Self {
            medium_vulnerability: 0.40,
            high_vulnerability: 0.65,
        }
    }
}

impl TcfdCriteria {
    fn validate(&self) -> Result<(), String> {
        fraction(
            "frameworks.tcfd.medium_vulnerability",
            self.medium_vulnerability,
        )?;
        fraction("frameworks.tcfd.high_vulnerability", self.high_vulnerability)?;
        if self.medium_vulnerability >= self.high_vulnerability {
            return Err(format!(
                "frameworks.tcfd: medium_vulnerability {} must be below high_vulnerability {}",
                self.medium_vulnerability, self.high_vulnerability
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MifidCriteria {
    pub article9_uplift: f64,
    pub article8_plus_uplift: f64,
    pub article8_uplift: f64,
    /// Deducted when either TCFD risk is High.
    pub high_risk_penalty: f64,
    pub pass_threshold: f64,
    pub partial_threshold: f64,
}

impl Default for MifidCriteria {
    fn default() -> Self {
        Self {
            article9_uplift: 1.5,
            article8_plus_uplift: 1.0,
            article8_uplift: 0.5,
            high_risk_penalty: 1.0,
            pass_threshold: 7.5,
            partial_threshold: 5.0,
        }
    }
}

impl MifidCriteria {
    fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("article9_uplift", self.article9_uplift),
            ("article8_plus_uplift", self.article8_plus_uplift),
            ("article8_uplift", self.article8_uplift),
            ("high_risk_penalty", self.high_risk_penalty),
            ("pass_threshold", self.pass_threshold),
            ("partial_threshold", self.partial_threshold),
        ] {
            if !value.is_finite() || !(0.0..=10.0).contains(&value) {
                return Err(format!(
                    "frameworks.mifid.{key}: {value} must be between 0 and 10"
                ));
            }
        }
        if self.partial_threshold >= self.pass_threshold {
            return Err(format!(
                "frameworks.mifid: partial_threshold {} must be below pass_threshold {}",
                self.partial_threshold, self.pass_threshold
            ));
        }
        Ok(())
    }
}

fn fraction(key: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{key}: {value} must be between 0.0 and 1.0"))
    }
}

fn score(key: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{key}: {value} must be between 0 and 100"))
    }
}
