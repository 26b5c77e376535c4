//! Country and sector reference tables.
//!
//! Country rows carry published indices (Transparency International CPI, ND-GAIN climate
//! vulnerability, UNDP HDI) and EU membership. Sector rows carry the defaults used when a
//! project does not disclose its own indicator values. Both tables can be replaced through
//! the engine configuration file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Resolved, RiskLevel};

pub const DEFAULT_FALLBACK_COUNTRY: &str = "Other / Unknown";
pub const DEFAULT_FALLBACK_SECTOR: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// Corruption perceptions index, 0-100 (higher is cleaner).
    pub cpi: f64,
    /// Climate vulnerability, 0-1.
    pub climate_vulnerability: f64,
    /// Human development index, 0-1.
    pub hdi: f64,
    pub eu_member: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorProfile {
    pub taxonomy_eligible: bool,
    pub ghg_intensity: f64,
    pub gender_equality: f64,
    pub social_factor: f64,
    /// Sectors with a structural local-employment effect earn the social bonus.
    pub high_social: bool,
    pub innovation_intensive: bool,
    pub transition_risk: RiskLevel,
    pub impact_material: bool,
    pub csrd_exempt: bool,
    pub fossil_fuel_exposure: bool,
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    High,
    Mid,
    Low,
}

impl Tier {
    const fn gender_factor(self) -> f64 {
        match self {
            Tier::High => 0.72,
            Tier::Mid => 0.58,
            Tier::Low => 0.44,
        }
    }

    const fn social_factor(self) -> f64 {
        match self {
            Tier::High => 0.82,
            Tier::Mid => 0.60,
            Tier::Low => 0.38,
        }
    }
}

struct SectorRow {
    name: &'static str,
    taxonomy_eligible: bool,
    ghg_intensity: f64,
    gender: Tier,
    social: Tier,
    innovation_intensive: bool,
    transition_risk: RiskLevel,
    impact_material: bool,
    csrd_exempt: bool,
    fossil_fuel_exposure: bool,
}

#[allow(clippy::too_many_arguments)]
const fn row(
    name: &'static str,
    taxonomy_eligible: bool,
    ghg_intensity: f64,
    gender: Tier,
    social: Tier,
    innovation_intensive: bool,
    transition_risk: RiskLevel,
    impact_material: bool,
) -> SectorRow {
    SectorRow {
        name,
        taxonomy_eligible,
        ghg_intensity,
        gender,
        social,
        innovation_intensive,
        transition_risk,
        impact_material,
        csrd_exempt: false,
        fossil_fuel_exposure: false,
    }
}

const fn csrd_exempt(mut sector: SectorRow) -> SectorRow {
    sector.csrd_exempt = true;
    sector
}

const fn fossil(mut sector: SectorRow) -> SectorRow {
    sector.fossil_fuel_exposure = true;
    sector
}

use RiskLevel::{High, Low, Medium};

const SECTORS: [SectorRow; 21] = [
    row("Renewable Energy", true, 0.05, Tier::Mid, Tier::Mid, true, Low, true),
    row("Energy Efficiency", true, 0.10, Tier::Mid, Tier::Mid, true, Low, false),
    row("Sustainable Agriculture", true, 0.35, Tier::Mid, Tier::Mid, false, Medium, false),
    row("Water & Sanitation", true, 0.08, Tier::High, Tier::High, true, Medium, false),
    row("Clean Transportation", true, 0.15, Tier::Low, Tier::Mid, true, Low, true),
    row("Green Building / Real Estate", true, 0.20, Tier::Mid, Tier::Mid, false, Medium, true),
    row("Circular Economy", true, 0.18, Tier::Mid, Tier::Mid, true, Low, false),
    row("Biodiversity / Nature", true, 0.05, Tier::Mid, Tier::Mid, false, Low, false),
    row("Healthcare", false, 0.22, Tier::High, Tier::High, false, Medium, false),
    row("Education & Skills", false, 0.12, Tier::High, Tier::High, true, Medium, false),
    csrd_exempt(row(
        "Financial Inclusion",
        false,
        0.10,
        Tier::High,
        Tier::High,
        true,
        Medium,
        false,
    )),
    row("Digital Infrastructure", false, 0.25, Tier::Low, Tier::Mid, true, Medium, false),
    row("Affordable Housing", false, 0.28, Tier::Mid, Tier::High, false, Medium, false),
    row("Food & Nutrition", false, 0.42, Tier::Mid, Tier::Mid, false, High, true),
    row("Manufacturing (conventional)", false, 0.65, Tier::Low, Tier::Low, false, High, true),
    fossil(row("Extractive Industry", false, 0.85, Tier::Low, Tier::Low, false, High, true)),
    row("Private Equity (diversified)", false, 0.40, Tier::Mid, Tier::Low, false, High, false),
    csrd_exempt(row("SME Finance", false, 0.30, Tier::Mid, Tier::Mid, false, Medium, false)),
    csrd_exempt(row("Microfinance", false, 0.15, Tier::High, Tier::High, false, Medium, false)),
    row("Social Infrastructure", true, 0.10, Tier::High, Tier::High, false, Medium, false),
    row(DEFAULT_FALLBACK_SECTOR, false, 0.40, Tier::Mid, Tier::Mid, false, Medium, false),
];

// (name, cpi, climate vulnerability, hdi, eu member)
const COUNTRIES: [(&str, f64, f64, f64, bool); 35] = [
    ("France", 71.0, 0.28, 0.903, true),
    ("Germany", 78.0, 0.25, 0.942, true),
    ("Netherlands", 79.0, 0.30, 0.941, true),
    ("Spain", 60.0, 0.38, 0.905, true),
    ("Italy", 56.0, 0.35, 0.895, true),
    ("Poland", 54.0, 0.32, 0.880, true),
    ("Romania", 46.0, 0.40, 0.821, true),
    ("Portugal", 62.0, 0.36, 0.866, true),
    ("Sweden", 85.0, 0.20, 0.952, true),
    ("Denmark", 90.0, 0.18, 0.948, true),
    ("Belgium", 73.0, 0.27, 0.937, true),
    ("Austria", 74.0, 0.22, 0.916, true),
    ("Czech Republic", 57.0, 0.31, 0.900, true),
    ("Hungary", 42.0, 0.42, 0.854, true),
    ("Greece", 49.0, 0.45, 0.887, true),
    ("United Kingdom", 71.0, 0.26, 0.929, false),
    ("Switzerland", 82.0, 0.19, 0.962, false),
    ("Norway", 84.0, 0.17, 0.966, false),
    ("United States", 69.0, 0.33, 0.926, false),
    ("Canada", 76.0, 0.28, 0.936, false),
    ("Brazil", 36.0, 0.55, 0.760, false),
    ("Mexico", 31.0, 0.60, 0.758, false),
    ("Morocco", 38.0, 0.62, 0.683, false),
    ("Senegal", 43.0, 0.72, 0.511, false),
    ("Kenya", 36.0, 0.70, 0.601, false),
    ("Nigeria", 25.0, 0.75, 0.535, false),
    ("South Africa", 41.0, 0.65, 0.713, false),
    ("India", 39.0, 0.58, 0.633, false),
    ("Vietnam", 41.0, 0.62, 0.703, false),
    ("Indonesia", 34.0, 0.66, 0.705, false),
    ("Japan", 73.0, 0.35, 0.920, false),
    ("Australia", 75.0, 0.32, 0.951, false),
    ("Chile", 66.0, 0.50, 0.860, false),
    ("Turkey", 34.0, 0.50, 0.838, false),
    (DEFAULT_FALLBACK_COUNTRY, 45.0, 0.50, 0.700, false),
];

/// Reference tables consulted by the normalizer and the regulatory gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub countries: BTreeMap<String, CountryProfile>,
    pub sectors: BTreeMap<String, SectorProfile>,
    /// Row used for country codes missing from `countries`.
    pub fallback_country: Option<String>,
    /// Row used for sector codes missing from `sectors`.
    pub fallback_sector: Option<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        let countries = COUNTRIES
            .iter()
            .map(|&(name, cpi, climate_vulnerability, hdi, eu_member)| {
                (
                    name.to_string(),
                    CountryProfile {
                        cpi,
                        climate_vulnerability,
                        hdi,
                        eu_member,
                    },
                )
            })
            .collect();

        let sectors = SECTORS
            .iter()
            .map(|sector| {
                (
                    sector.name.to_string(),
                    SectorProfile {
                        taxonomy_eligible: sector.taxonomy_eligible,
                        ghg_intensity: sector.ghg_intensity,
                        gender_equality: sector.gender.gender_factor(),
                        social_factor: sector.social.social_factor(),
                        high_social: matches!(sector.social, Tier::High),
                        innovation_intensive: sector.innovation_intensive,
                        transition_risk: sector.transition_risk,
                        impact_material: sector.impact_material,
                        csrd_exempt: sector.csrd_exempt,
                        fossil_fuel_exposure: sector.fossil_fuel_exposure,
                    },
                )
            })
            .collect();

        Self {
            countries,
            sectors,
            fallback_country: Some(DEFAULT_FALLBACK_COUNTRY.to_string()),
            fallback_sector: Some(DEFAULT_FALLBACK_SECTOR.to_string()),
        }
    }
}

impl ReferenceData {
    /// Look up a country. Unknown names resolve to the fallback row as a proxy.
    pub fn country(&self, name: &str) -> Option<Resolved<CountryProfile>> {
        lookup(&self.countries, name, self.fallback_country.as_deref())
    }

    /// Look up a sector. Unknown names resolve to the fallback row as a proxy.
    pub fn sector(&self, name: &str) -> Option<Resolved<SectorProfile>> {
        lookup(&self.sectors, name, self.fallback_sector.as_deref())
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if let Some(fallback) = &self.fallback_country {
            if !self.countries.contains_key(fallback) {
                return Err(format!(
                    "reference.fallback_country '{fallback}' is not a row of reference.countries"
                ));
            }
        }
        if let Some(fallback) = &self.fallback_sector {
            if !self.sectors.contains_key(fallback) {
                return Err(format!(
                    "reference.fallback_sector '{fallback}' is not a row of reference.sectors"
                ));
            }
        }

        for (name, country) in &self.countries {
            if !(0.0..=100.0).contains(&country.cpi)
                || !(0.0..=1.0).contains(&country.climate_vulnerability)
                || !(0.0..=1.0).contains(&country.hdi)
            {
                return Err(format!("reference.countries.'{name}' has an index out of range"));
            }
        }

        for (name, sector) in &self.sectors {
            let factors = [
                sector.ghg_intensity,
                sector.gender_equality,
                sector.social_factor,
            ];
            if factors.iter().any(|value| !(0.0..=1.0).contains(value)) {
                return Err(format!("reference.sectors.'{name}' has a factor outside 0-1"));
            }
        }

        Ok(())
    }
}

fn lookup<T: Copy>(
    table: &BTreeMap<String, T>,
    name: &str,
    fallback: Option<&str>,
) -> Option<Resolved<T>> {
    let trimmed = name.trim();
    if let Some(row) = table.get(trimmed) {
        return Some(Resolved::Measured(*row));
    }

    if let Some(row) = table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(trimmed))
        .map(|(_, row)| *row)
    {
        return Some(Resolved::Measured(row));
    }

    fallback
        .and_then(|key| table.get(key))
        .map(|row| Resolved::Proxied(*row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_validate() {
        let reference = ReferenceData::default();
        assert!(reference.validate().is_ok());
        assert_eq!(reference.countries.len(), 35);
        assert_eq!(reference.sectors.len(), 21);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let reference = ReferenceData::default();
        let germany = reference.country("  germany ").expect("germany resolves");
        assert!(!germany.is_proxied());
        assert!(germany.value().eu_member);
    }

    #[test]
    fn unknown_codes_fall_back_as_proxies() {
        let reference = ReferenceData::default();
        let country = reference.country("Atlantis").expect("fallback row");
        assert!(country.is_proxied());
        assert_eq!(country.value().cpi, 45.0);

        let sector = reference.sector("Space Mining").expect("fallback row");
        assert!(sector.is_proxied());
        assert!(!sector.value().taxonomy_eligible);
    }

    #[test]
    fn lookup_without_fallback_yields_none() {
        let reference = ReferenceData {
            fallback_country: None,
            ..ReferenceData::default()
        };
        assert!(reference.country("Atlantis").is_none());
    }

    #[test]
    fn dangling_fallback_is_rejected() {
        let reference = ReferenceData {
            fallback_sector: Some("Nope".to_string()),
            ..ReferenceData::default()
        };
        let err = reference.validate().expect_err("fallback must exist");
        assert!(err.contains("fallback_sector"));
    }

    #[test]
    fn sector_defaults_follow_tiers() {
        let reference = ReferenceData::default();
        let health = reference.sector("Healthcare").expect("row").value();
        assert_eq!(health.gender_equality, 0.72);
        assert!(health.high_social);

        let extractive = reference.sector("Extractive Industry").expect("row").value();
        assert!(extractive.fossil_fuel_exposure);
        assert_eq!(extractive.transition_risk, RiskLevel::High);
    }
}
