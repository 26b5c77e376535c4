//! Maps a raw [`ProjectRecord`] onto the eight dimension scores.
//!
//! Every raw field resolves to [`Resolved::Measured`] or [`Resolved::Proxied`]. Proxies come
//! from the reference tables; a dimension only fails when one of its inputs has neither a
//! reported value nor a proxy source.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    Dimension, DimensionScore, DimensionScores, ProjectRecord, Provenance, ProxyNote, Resolved,
};
use super::reference::{CountryProfile, ReferenceData, SectorProfile};

const MIN_TICKET_EUR: f64 = 1_500.0;
const MAX_TICKET_EUR: f64 = 50_000_000.0;
const WATER_INTENSIVE_THRESHOLD: f64 = 0.4;
const SOCIAL_SECTOR_BONUS: f64 = 15.0;
const STRUCTURED_ASSET_CLASSES: [&str; 2] = ["Green Bond", "Project Finance"];

/// Default values substituted for unusable record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyDefaults {
    /// Ticket size assumed when the investment amount is missing or invalid.
    pub investment_eur: f64,
}

impl Default for ProxyDefaults {
    fn default() -> Self {
        Self {
            investment_eur: MIN_TICKET_EUR,
        }
    }
}

impl ProxyDefaults {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.investment_eur.is_finite() && self.investment_eur > 0.0 {
            Ok(())
        } else {
            Err("proxy.investment_eur must be a positive amount".to_string())
        }
    }
}

/// Fully resolved project inputs, shared read-only with the gates and the PAI dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub country: CountryProfile,
    pub sector: SectorProfile,
    pub asset_class: String,
    pub investment_eur: f64,
    pub size_factor: f64,
    pub ghg_intensity: f64,
    pub gender_equality: f64,
    pub social_factor: f64,
    pub water_intensity: f64,
    pub taxonomy_eligible: bool,
    pub csrd_in_scope: Option<bool>,
}

/// Normalizer output for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub scores: DimensionScores,
    pub context: ProjectContext,
    pub notes: Vec<ProxyNote>,
}

/// Log-scale ticket normalisation: EUR 1,500 maps to 0.0 and EUR 50M to 1.0.
pub fn size_factor(investment_eur: f64) -> f64 {
    let lo = MIN_TICKET_EUR.ln();
    let hi = MAX_TICKET_EUR.ln();
    ((investment_eur.max(MIN_TICKET_EUR).ln() - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Normalize one record. On failure returns every dimension lacking data.
pub fn normalize(
    record: &ProjectRecord,
    reference: &ReferenceData,
    proxies: &ProxyDefaults,
) -> Result<Normalized, Vec<Dimension>> {
    let mut notes = Vec::new();

    let country = resolve_country(record, reference, &mut notes);
    let sector = resolve_sector(record, reference, &mut notes);
    let investment = resolve_investment(record, proxies, &mut notes);
    let size = investment.map(size_factor);

    let ghg = resolve_fraction(
        "ghg_intensity",
        record.ghg_intensity,
        sector.map(|s| s.map(|profile| profile.ghg_intensity)),
        &[Dimension::Climate, Dimension::Pollution],
        &mut notes,
    );
    let gender = resolve_fraction(
        "gender_equality",
        record.gender_equality,
        sector.map(|s| s.map(|profile| profile.gender_equality)),
        &[Dimension::Gender],
        &mut notes,
    );
    let social = resolve_fraction(
        "social_factor",
        record.social_factor,
        sector.map(|s| s.map(|profile| profile.social_factor)),
        &[Dimension::SocialMobility],
        &mut notes,
    );
    let water = resolve_fraction(
        "water_intensity",
        record.water_intensity,
        ghg.map(|g| Resolved::Proxied(g.value())),
        &[Dimension::Water],
        &mut notes,
    );
    let taxonomy_eligible = match record.taxonomy_eligible {
        Some(flag) => Some(Resolved::Measured(flag)),
        None => sector.map(|s| s.map(|profile| profile.taxonomy_eligible)),
    };
    let governance_override = resolve_governance_override(record, &mut notes);

    let vulnerability = country.map(|c| c.map(|profile| profile.climate_vulnerability));
    let hdi = country.map(|c| c.map(|profile| profile.hdi));

    let climate = score_climate(ghg, taxonomy_eligible, vulnerability, size);
    let water_score = score_water(water, vulnerability);
    let gender_score = score_gender(gender, country);
    let social_score = score_social_mobility(social, hdi, sector, size);
    let territory = score_territory(country, size);
    let governance = score_governance(record, governance_override, country);
    let pollution = score_pollution(ghg, taxonomy_eligible);
    let innovation = score_innovation(sector, hdi, size);

    let computed = [
        climate,
        water_score,
        gender_score,
        social_score,
        territory,
        governance,
        pollution,
        innovation,
    ];

    let missing: Vec<Dimension> = Dimension::ordered()
        .into_iter()
        .zip(computed.iter())
        .filter(|(_, computed)| computed.is_none())
        .map(|(dimension, _)| dimension)
        .collect();

    let (
        [
            Some(climate),
            Some(water_score),
            Some(gender_score),
            Some(social_score),
            Some(territory),
            Some(governance),
            Some(pollution),
            Some(innovation),
        ],
        Some(country),
        Some(sector),
        Some(ghg),
        Some(gender),
        Some(social),
        Some(water),
        Some(taxonomy_eligible),
    ) = (computed, country, sector, ghg, gender, social, water, taxonomy_eligible)
    else {
        return Err(if missing.is_empty() {
            Dimension::ordered().to_vec()
        } else {
            missing
        });
    };

    let scores = DimensionScores::new([
        climate,
        water_score,
        gender_score,
        social_score,
        territory,
        governance,
        pollution,
        innovation,
    ]);

    Ok(Normalized {
        scores,
        context: ProjectContext {
            country: country.value(),
            sector: sector.value(),
            asset_class: record.asset_class.trim().to_string(),
            investment_eur: investment.value(),
            size_factor: size.value(),
            ghg_intensity: ghg.value(),
            gender_equality: gender.value(),
            social_factor: social.value(),
            water_intensity: water.value(),
            taxonomy_eligible: taxonomy_eligible.value(),
            csrd_in_scope: record.csrd_in_scope,
        },
        notes,
    })
}

fn score_climate(
    ghg: Option<Resolved<f64>>,
    eligible: Option<Resolved<bool>>,
    vulnerability: Option<Resolved<f64>>,
    size: Resolved<f64>,
) -> Option<DimensionScore> {
    let (g, elig, vuln) = (ghg?, eligible?, vulnerability?);
    let raw = (1.0 - g.value()) * 70.0 + bonus(elig.value(), 20.0) - vuln.value() * 15.0
        + size.value() * 5.0;
    let inputs = [
        g.provenance(),
        elig.provenance(),
        vuln.provenance(),
        size.provenance(),
    ];
    Some(score(raw, &inputs))
}

/// Above the intensive threshold the penalty is flat.
fn score_water(
    water: Option<Resolved<f64>>,
    vulnerability: Option<Resolved<f64>>,
) -> Option<DimensionScore> {
    let (w, vuln) = (water?, vulnerability?);
    let intensity = w.value();
    let penalty = if intensity > WATER_INTENSIVE_THRESHOLD {
        40.0
    } else {
        intensity * 30.0
    };
    let raw = 70.0 - penalty - vuln.value() * 20.0;
    Some(score(raw, &[w.provenance(), vuln.provenance()]))
}

fn score_gender(
    gender: Option<Resolved<f64>>,
    country: Option<Resolved<CountryProfile>>,
) -> Option<DimensionScore> {
    let (g, c) = (gender?, country?);
    let cpi = c.value().cpi / 100.0;
    let raw = g.value() * 55.0 + cpi * 25.0 + c.value().hdi * 15.0 - (1.0 - cpi) * 20.0;
    Some(score(raw * (100.0 / 75.0), &[g.provenance(), c.provenance()]))
}

fn score_social_mobility(
    social: Option<Resolved<f64>>,
    hdi: Option<Resolved<f64>>,
    sector: Option<Resolved<SectorProfile>>,
    size: Resolved<f64>,
) -> Option<DimensionScore> {
    let (sf, h) = (social?, hdi?);
    let sf_value = sf.value();
    let hdi_value = h.value();
    let high_social = sector.map(|s| s.value().high_social).unwrap_or(false);
    let raw = sf_value * 50.0 + hdi_value * 25.0 + size.value() * 15.0
        + bonus(high_social, SOCIAL_SECTOR_BONUS)
        - (1.0 - hdi_value) * (1.0 - sf_value) * 25.0;
    Some(score(raw, &[sf.provenance(), h.provenance(), size.provenance()]))
}

fn score_territory(
    country: Option<Resolved<CountryProfile>>,
    size: Resolved<f64>,
) -> Option<DimensionScore> {
    let c = country?;
    let profile = c.value();
    let governance_bonus = if profile.eu_member { 20.0 } else { 10.0 };
    let raw = 30.0 + (1.0 - profile.hdi) * 40.0 + governance_bonus + size.value() * 10.0;
    Some(score(raw, &[c.provenance(), size.provenance()]))
}

/// A valid reported score wins; otherwise derived from country indices and asset class.
/// A rejected override marks the derived score as proxied.
fn score_governance(
    record: &ProjectRecord,
    reported: Option<f64>,
    country: Option<Resolved<CountryProfile>>,
) -> Option<DimensionScore> {
    if let Some(value) = reported {
        return Some(DimensionScore::new(value, Provenance::Measured));
    }
    let c = country?;
    let profile = c.value();
    let structured = STRUCTURED_ASSET_CLASSES
        .iter()
        .any(|class| class.eq_ignore_ascii_case(record.asset_class.trim()));
    let raw = (profile.cpi / 100.0) * 65.0
        + bonus(profile.eu_member, 20.0)
        + bonus(structured, 10.0);
    let provenance = if record.governance_score.is_some() {
        Provenance::Proxied
    } else {
        c.provenance()
    };
    Some(DimensionScore::new(raw, provenance))
}

fn score_pollution(
    ghg: Option<Resolved<f64>>,
    eligible: Option<Resolved<bool>>,
) -> Option<DimensionScore> {
    let (g, elig) = (ghg?, eligible?);
    let raw = (1.0 - g.value()) * 75.0 + bonus(elig.value(), 20.0);
    Some(score(raw, &[g.provenance(), elig.provenance()]))
}

fn score_innovation(
    sector: Option<Resolved<SectorProfile>>,
    hdi: Option<Resolved<f64>>,
    size: Resolved<f64>,
) -> Option<DimensionScore> {
    let (s, h) = (sector?, hdi?);
    let raw = 40.0
        + bonus(s.value().innovation_intensive, 30.0)
        + size.value() * 20.0
        + h.value() * 10.0;
    Some(score(raw, &[s.provenance(), h.provenance(), size.provenance()]))
}

fn bonus(flag: bool, points: f64) -> f64 {
    if flag {
        points
    } else {
        0.0
    }
}

fn score(raw: f64, inputs: &[Provenance]) -> DimensionScore {
    let provenance = if inputs.contains(&Provenance::Proxied) {
        Provenance::Proxied
    } else {
        Provenance::Measured
    };
    DimensionScore::new(raw, provenance)
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve_country(
    record: &ProjectRecord,
    reference: &ReferenceData,
    notes: &mut Vec<ProxyNote>,
) -> Option<Resolved<CountryProfile>> {
    let name = present(&record.country)?;
    let resolved = reference.country(name)?;
    if resolved.is_proxied() {
        notes.push(ProxyNote {
            field: "country".to_string(),
            dimensions: vec![
                Dimension::Climate,
                Dimension::Water,
                Dimension::Gender,
                Dimension::SocialMobility,
                Dimension::Territory,
                Dimension::Governance,
                Dimension::Innovation,
            ],
            detail: format!(
                "unknown country '{name}', using '{}' reference indices",
                reference.fallback_country.as_deref().unwrap_or_default()
            ),
        });
    }
    Some(resolved)
}

fn resolve_sector(
    record: &ProjectRecord,
    reference: &ReferenceData,
    notes: &mut Vec<ProxyNote>,
) -> Option<Resolved<SectorProfile>> {
    let name = present(&record.sector)?;
    let resolved = reference.sector(name)?;
    if resolved.is_proxied() {
        notes.push(ProxyNote {
            field: "sector".to_string(),
            dimensions: vec![Dimension::Innovation],
            detail: format!(
                "unknown sector '{name}', using '{}' sector profile",
                reference.fallback_sector.as_deref().unwrap_or_default()
            ),
        });
    }
    Some(resolved)
}

fn resolve_investment(
    record: &ProjectRecord,
    proxies: &ProxyDefaults,
    notes: &mut Vec<ProxyNote>,
) -> Resolved<f64> {
    match record.investment_eur {
        Some(amount) if amount.is_finite() && amount > 0.0 => Resolved::Measured(amount),
        other => {
            let detail = match other {
                Some(amount) => format!(
                    "investment amount {amount} is not a positive figure, assuming EUR {:.0}",
                    proxies.investment_eur
                ),
                None => format!(
                    "investment amount not reported, assuming EUR {:.0}",
                    proxies.investment_eur
                ),
            };
            notes.push(ProxyNote {
                field: "investment_eur".to_string(),
                dimensions: vec![
                    Dimension::Climate,
                    Dimension::SocialMobility,
                    Dimension::Territory,
                    Dimension::Innovation,
                ],
                detail,
            });
            Resolved::Proxied(proxies.investment_eur)
        }
    }
}

/// Resolve a 0-1 raw factor, falling back to `proxy` when missing or out of range.
fn resolve_fraction(
    field: &str,
    raw: Option<f64>,
    proxy: Option<Resolved<f64>>,
    dimensions: &[Dimension],
    notes: &mut Vec<ProxyNote>,
) -> Option<Resolved<f64>> {
    let rejected = match raw {
        Some(value) if value.is_finite() && (0.0..=1.0).contains(&value) => {
            return Some(Resolved::Measured(value));
        }
        Some(value) => Some(value),
        None => None,
    };

    let proxy = proxy?;
    let detail = match rejected {
        Some(value) => format!(
            "{field} {value} outside 0-1, substituted {:.2}",
            proxy.value()
        ),
        None => format!("{field} not reported, substituted {:.2}", proxy.value()),
    };
    debug!(field, proxy = proxy.value(), "substituting proxy value");
    notes.push(ProxyNote {
        field: field.to_string(),
        dimensions: dimensions.to_vec(),
        detail,
    });
    Some(Resolved::Proxied(proxy.value()))
}

fn resolve_governance_override(
    record: &ProjectRecord,
    notes: &mut Vec<ProxyNote>,
) -> Option<f64> {
    match record.governance_score {
        Some(value) if value.is_finite() && (0.0..=100.0).contains(&value) => Some(value),
        Some(value) => {
            notes.push(ProxyNote {
                field: "governance_score".to_string(),
                dimensions: vec![Dimension::Governance],
                detail: format!(
                    "governance score {value} outside 0-100, derived from country indices"
                ),
            });
            None
        }
        None => None,
    }
}
