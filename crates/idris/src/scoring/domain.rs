use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Input record describing one investment project as delivered by the data feed.
///
/// The record is flat so that a single CSV row maps onto it. Every raw indicator is
/// optional: missing or out-of-domain values are resolved through reference-table proxies
/// by the normalizer instead of being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub asset_class: String,
    #[serde(default)]
    pub investment_eur: Option<f64>,
    #[serde(default)]
    pub csrd_in_scope: Option<bool>,
    /// Analyst-provided GHG intensity (0-1), overrides the sector default.
    #[serde(default)]
    pub ghg_intensity: Option<f64>,
    /// Analyst-provided gender equality factor (0-1).
    #[serde(default)]
    pub gender_equality: Option<f64>,
    /// Local value creation factor (0-1).
    #[serde(default)]
    pub social_factor: Option<f64>,
    /// Water withdrawal intensity (0-1).
    #[serde(default)]
    pub water_intensity: Option<f64>,
    #[serde(default)]
    pub taxonomy_eligible: Option<bool>,
    /// Analyst-provided governance score (0-100).
    #[serde(default)]
    pub governance_score: Option<f64>,
}

impl ProjectRecord {
    pub fn new(
        project_id: impl Into<String>,
        country: impl Into<String>,
        sector: impl Into<String>,
        asset_class: impl Into<String>,
        investment_eur: f64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            country: Some(country.into()),
            sector: Some(sector.into()),
            asset_class: asset_class.into(),
            investment_eur: Some(investment_eur),
            csrd_in_scope: None,
            ghg_intensity: None,
            gender_equality: None,
            social_factor: None,
            water_intensity: None,
            taxonomy_eligible: None,
            governance_score: None,
        }
    }

    pub fn with_ghg_intensity(mut self, value: f64) -> Self {
        self.ghg_intensity = Some(value);
        self
    }

    pub fn with_gender_equality(mut self, value: f64) -> Self {
        self.gender_equality = Some(value);
        self
    }

    pub fn with_social_factor(mut self, value: f64) -> Self {
        self.social_factor = Some(value);
        self
    }

    pub fn with_water_intensity(mut self, value: f64) -> Self {
        self.water_intensity = Some(value);
        self
    }

    pub fn with_governance_score(mut self, value: f64) -> Self {
        self.governance_score = Some(value);
        self
    }

    pub fn with_csrd_in_scope(mut self, in_scope: bool) -> Self {
        self.csrd_in_scope = Some(in_scope);
        self
    }

    /// SHA-256 over a canonical field encoding; stable across runs and platforms.
    pub fn content_hash(&self) -> String {
        let canonical = format!(
            "project_id={:?}\ncountry={:?}\nsector={:?}\nasset_class={:?}\ninvestment_eur={:?}\n\
             csrd_in_scope={:?}\nghg_intensity={:?}\ngender_equality={:?}\nsocial_factor={:?}\n\
             water_intensity={:?}\ntaxonomy_eligible={:?}\ngovernance_score={:?}\n",
            self.project_id,
            self.country,
            self.sector,
            self.asset_class,
            self.investment_eur.map(f64::to_bits),
            self.csrd_in_scope,
            self.ghg_intensity.map(f64::to_bits),
            self.gender_equality.map(f64::to_bits),
            self.social_factor.map(f64::to_bits),
            self.water_intensity.map(f64::to_bits),
            self.taxonomy_eligible,
            self.governance_score.map(f64::to_bits),
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// The eight impact dimensions, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Climate,
    Water,
    Gender,
    #[serde(rename = "social")]
    SocialMobility,
    Territory,
    Governance,
    Pollution,
    Innovation,
}

impl Dimension {
    pub const COUNT: usize = 8;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Climate,
            Self::Water,
            Self::Gender,
            Self::SocialMobility,
            Self::Territory,
            Self::Governance,
            Self::Pollution,
            Self::Innovation,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Climate => 0,
            Self::Water => 1,
            Self::Gender => 2,
            Self::SocialMobility => 3,
            Self::Territory => 4,
            Self::Governance => 5,
            Self::Pollution => 6,
            Self::Innovation => 7,
        }
    }

    /// Stable machine key, used for column names and configuration tables.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Climate => "climate",
            Self::Water => "water",
            Self::Gender => "gender",
            Self::SocialMobility => "social",
            Self::Territory => "territory",
            Self::Governance => "governance",
            Self::Pollution => "pollution",
            Self::Innovation => "innovation",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Climate => "Climate & Environment",
            Self::Water => "Water & Resources",
            Self::Gender => "Gender Equity",
            Self::SocialMobility => "Social Mobility",
            Self::Territory => "Territory & Wealth",
            Self::Governance => "Governance",
            Self::Pollution => "Pollution & Health",
            Self::Innovation => "Innovation",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a value was computed from reported data or from a proxy substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Measured,
    Proxied,
}

/// A raw input after proxy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolved<T> {
    Measured(T),
    Proxied(T),
}

impl<T: Copy> Resolved<T> {
    pub fn value(&self) -> T {
        match self {
            Resolved::Measured(value) | Resolved::Proxied(value) => *value,
        }
    }
}

impl<T> Resolved<T> {
    pub fn is_proxied(&self) -> bool {
        matches!(self, Resolved::Proxied(_))
    }

    pub fn provenance(&self) -> Provenance {
        if self.is_proxied() {
            Provenance::Proxied
        } else {
            Provenance::Measured
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Measured(value) => Resolved::Measured(f(value)),
            Resolved::Proxied(value) => Resolved::Proxied(f(value)),
        }
    }
}

/// Annotation recorded whenever the normalizer substitutes a proxy for a raw field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyNote {
    pub field: String,
    pub dimensions: Vec<Dimension>,
    pub detail: String,
}

/// One dimension score, clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub value: f64,
    pub provenance: Provenance,
}

impl DimensionScore {
    pub fn new(value: f64, provenance: Provenance) -> Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self { value, provenance }
    }

    pub fn measured(value: f64) -> Self {
        Self::new(value, Provenance::Measured)
    }
}

/// Exactly eight dimension scores indexed by [`Dimension`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    scores: [DimensionScore; Dimension::COUNT],
}

impl DimensionScores {
    pub fn new(scores: [DimensionScore; Dimension::COUNT]) -> Self {
        Self { scores }
    }

    /// Measured scores given in canonical dimension order.
    pub fn from_values(values: [f64; Dimension::COUNT]) -> Self {
        Self {
            scores: values.map(DimensionScore::measured),
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::from_values([value; Dimension::COUNT])
    }

    pub fn with(mut self, dimension: Dimension, value: f64) -> Self {
        self.scores[dimension.index()] = DimensionScore::measured(value);
        self
    }

    pub fn get(&self, dimension: Dimension) -> DimensionScore {
        self.scores[dimension.index()]
    }

    pub fn value(&self, dimension: Dimension) -> f64 {
        self.scores[dimension.index()].value
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, DimensionScore)> + '_ {
        Dimension::ordered()
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }

    pub fn proxied_dimensions(&self) -> Vec<Dimension> {
        self.iter()
            .filter(|(_, score)| score.provenance == Provenance::Proxied)
            .map(|(dimension, _)| dimension)
            .collect()
    }
}

/// Qualitative band, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Red,
    Amber,
    Green,
    DarkGreen,
}

impl Band {
    pub const fn ordered() -> [Self; 4] {
        [Self::Red, Self::Amber, Self::Green, Self::DarkGreen]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Amber => "amber",
            Self::Green => "green",
            Self::DarkGreen => "dark_green",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Amber => "Amber",
            Self::Green => "Green",
            Self::DarkGreen => "Dark Green",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-level risk rating used by TCFD and the sector reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}
