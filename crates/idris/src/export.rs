//! Record import and result export.
//!
//! Exported shapes carry plain strings and numbers only, so downstream consumers never
//! depend on engine types.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::scoring::{
    flags, round1, BatchOutcome, Dimension, Framework, FrameworkDetail, PaiMeasure, PaiMetric,
    ProjectRecord, Provenance, ScoredResult,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
}

/// One CSV row of raw project data. Unparseable values are treated as not reported.
#[derive(Debug, Deserialize)]
struct RecordRow {
    project_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sector: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    asset_class: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    investment_eur: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    csrd_in_scope: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ghg_intensity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gender_equality: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    social_factor: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    water_intensity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    taxonomy_eligible: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    governance_score: Option<String>,
}

impl From<RecordRow> for ProjectRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            project_id: row.project_id,
            country: row.country,
            sector: row.sector,
            asset_class: row.asset_class.unwrap_or_default(),
            investment_eur: parse_number(row.investment_eur),
            csrd_in_scope: parse_flag(row.csrd_in_scope),
            ghg_intensity: parse_number(row.ghg_intensity),
            gender_equality: parse_number(row.gender_equality),
            social_factor: parse_number(row.social_factor),
            water_intensity: parse_number(row.water_intensity),
            taxonomy_eligible: parse_flag(row.taxonomy_eligible),
            governance_score: parse_number(row.governance_score),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_number(value: Option<String>) -> Option<f64> {
    value.and_then(|value| value.trim().replace('_', "").parse::<f64>().ok())
}

fn parse_flag(value: Option<String>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn read_records_csv<R: Read>(reader: R) -> Result<Vec<ProjectRecord>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RecordRow>() {
        records.push(ProjectRecord::from(row?));
    }
    Ok(records)
}

/// Accepts either a JSON array of records or a single record object.
pub fn read_records_json<R: Read>(reader: R) -> Result<Vec<ProjectRecord>, ExportError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Many(Vec<ProjectRecord>),
        One(ProjectRecord),
    }

    Ok(match serde_json::from_reader(reader)? {
        Payload::Many(records) => records,
        Payload::One(record) => vec![record],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDocument {
    pub score: f64,
    pub proxied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyDocument {
    pub field: String,
    pub dimensions: Vec<String>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDocument {
    pub key: String,
    pub passed: bool,
    pub mandatory: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDocument {
    pub framework: String,
    pub outcome: String,
    pub criteria: Vec<CriterionDocument>,
    /// Framework-specific figures (article, risk levels, suitability, ...).
    pub detail: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaiDocument {
    pub number: u8,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed: Option<bool>,
    pub adverse: bool,
}

/// Nested JSON view of a scored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub project_id: String,
    pub input_hash: String,
    pub composite: f64,
    pub raw_band: String,
    pub band: String,
    pub social_veto: bool,
    pub veto_dimensions: Vec<String>,
    pub dimensions: BTreeMap<String, DimensionDocument>,
    pub proxies: Vec<ProxyDocument>,
    pub sfdr_article: Option<String>,
    pub gates: Vec<GateDocument>,
    pub pai_score: f64,
    pub pai: Vec<PaiDocument>,
    pub warnings: Vec<String>,
    pub strengths: Vec<String>,
}

impl From<&ScoredResult> for ScoredDocument {
    fn from(result: &ScoredResult) -> Self {
        let dimensions = result
            .scores
            .iter()
            .map(|(dimension, score)| {
                (
                    dimension.key().to_string(),
                    DimensionDocument {
                        score: round1(score.value),
                        proxied: score.provenance == Provenance::Proxied,
                    },
                )
            })
            .collect();

        let proxies = result
            .notes
            .iter()
            .map(|note| ProxyDocument {
                field: note.field.clone(),
                dimensions: dimension_keys(&note.dimensions),
                detail: note.detail.clone(),
            })
            .collect();

        let gates = result
            .gates
            .gates()
            .iter()
            .map(|gate| GateDocument {
                framework: gate.framework.label().to_string(),
                outcome: gate.outcome.label().to_string(),
                criteria: gate
                    .criteria
                    .iter()
                    .map(|criterion| CriterionDocument {
                        key: criterion.key.clone(),
                        passed: criterion.passed,
                        mandatory: criterion.mandatory,
                        detail: criterion.detail.clone(),
                    })
                    .collect(),
                detail: detail_fields(&gate.detail),
            })
            .collect();

        let pai = result
            .pai
            .indicators()
            .iter()
            .map(|indicator| {
                let (score, exposed) = match indicator.measure {
                    PaiMeasure::Score(value) => (Some(round1(value)), None),
                    PaiMeasure::Exposure(flag) => (None, Some(flag)),
                };
                PaiDocument {
                    number: indicator.metric.number(),
                    name: indicator.metric.label().to_string(),
                    score,
                    exposed,
                    adverse: indicator.adverse,
                }
            })
            .collect();

        Self {
            project_id: result.project_id.clone(),
            input_hash: result.input_hash.clone(),
            composite: result.composite.presented(),
            raw_band: result.banding.raw.label().to_string(),
            band: result.band().label().to_string(),
            social_veto: result.veto.is_triggered(),
            veto_dimensions: dimension_keys(&result.veto.triggered_by),
            dimensions,
            proxies,
            sfdr_article: result
                .sfdr_article()
                .map(|article| article.label().to_string()),
            gates,
            pai_score: result.pai.summary_score(),
            pai,
            warnings: flags::warnings(&result.flags)
                .map(|flag| flag.message.clone())
                .collect(),
            strengths: flags::strengths(&result.flags)
                .map(|flag| flag.message.clone())
                .collect(),
        }
    }
}

fn detail_fields(detail: &FrameworkDetail) -> BTreeMap<String, serde_json::Value> {
    use serde_json::json;

    let fields = match detail {
        FrameworkDetail::EuTaxonomy {
            eligible,
            aligned,
            dnsh_pass,
            substantial_contribution_pct,
        } => vec![
            ("eligible", json!(eligible)),
            ("aligned", json!(aligned)),
            ("dnsh_pass", json!(dnsh_pass)),
            (
                "substantial_contribution_pct",
                json!(substantial_contribution_pct),
            ),
        ],
        FrameworkDetail::Sfdr { article } => vec![("article", json!(article.label()))],
        FrameworkDetail::Csrd {
            in_scope,
            scope_proxied,
            impact_material,
            financial_material,
        } => vec![
            ("in_scope", json!(in_scope)),
            ("scope_proxied", json!(scope_proxied)),
            ("impact_material", json!(impact_material)),
            ("financial_material", json!(financial_material)),
        ],
        FrameworkDetail::Tcfd {
            physical_risk,
            transition_risk,
        } => vec![
            ("physical_risk", json!(physical_risk.label())),
            ("transition_risk", json!(transition_risk.label())),
        ],
        FrameworkDetail::MifidII {
            suitability,
            profile,
        } => vec![
            ("suitability", json!(suitability)),
            ("profile", json!(profile.label())),
        ],
    };

    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Flat CSV view of a scored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub project_id: String,
    pub composite: f64,
    pub raw_band: String,
    pub band: String,
    pub social_veto: bool,
    pub climate: f64,
    pub water: f64,
    pub gender: f64,
    pub social: f64,
    pub territory: f64,
    pub governance: f64,
    pub pollution: f64,
    pub innovation: f64,
    /// Semicolon-separated keys of proxied dimensions.
    pub proxied_dimensions: String,
    pub eu_taxonomy: String,
    pub sfdr: String,
    pub sfdr_article: String,
    pub csrd: String,
    pub tcfd: String,
    pub mifid_ii: String,
    pub pai_01_ghg_emissions: f64,
    pub pai_02_carbon_footprint: f64,
    pub pai_04_fossil_fuel_exposure: bool,
    pub pai_07_biodiversity_sensitive_areas: f64,
    pub pai_08_emissions_to_water: f64,
    pub pai_09_hazardous_waste: f64,
    pub pai_12_gender_pay_gap: f64,
    pub pai_13_board_gender_diversity: f64,
    pub pai_15_anti_corruption: f64,
    pub pai_16_non_cooperative_tax: bool,
    pub pai_score: f64,
    pub pai_adverse: usize,
    pub warnings: usize,
    /// Semicolon-separated flag codes, warnings first.
    pub flags: String,
    pub input_hash: String,
}

impl From<&ScoredResult> for ScoredRow {
    fn from(result: &ScoredResult) -> Self {
        let score = |dimension: Dimension| round1(result.scores.value(dimension));
        let outcome = |framework: Framework| {
            result
                .gates
                .outcome(framework)
                .map(|outcome| outcome.label().to_string())
                .unwrap_or_default()
        };
        let pai_value = |metric: PaiMetric| match result.pai.get(metric).map(|i| i.measure) {
            Some(PaiMeasure::Score(value)) => round1(value),
            _ => 0.0,
        };
        let pai_exposed = |metric: PaiMetric| {
            matches!(
                result.pai.get(metric).map(|i| i.measure),
                Some(PaiMeasure::Exposure(true))
            )
        };

        Self {
            project_id: result.project_id.clone(),
            composite: result.composite.presented(),
            raw_band: result.banding.raw.label().to_string(),
            band: result.band().label().to_string(),
            social_veto: result.veto.is_triggered(),
            climate: score(Dimension::Climate),
            water: score(Dimension::Water),
            gender: score(Dimension::Gender),
            social: score(Dimension::SocialMobility),
            territory: score(Dimension::Territory),
            governance: score(Dimension::Governance),
            pollution: score(Dimension::Pollution),
            innovation: score(Dimension::Innovation),
            proxied_dimensions: dimension_keys(&result.scores.proxied_dimensions()).join(";"),
            eu_taxonomy: outcome(Framework::EuTaxonomy),
            sfdr: outcome(Framework::Sfdr),
            sfdr_article: result
                .sfdr_article()
                .map(|article| article.label().to_string())
                .unwrap_or_default(),
            csrd: outcome(Framework::Csrd),
            tcfd: outcome(Framework::Tcfd),
            mifid_ii: outcome(Framework::MifidII),
            pai_01_ghg_emissions: pai_value(PaiMetric::GhgEmissions),
            pai_02_carbon_footprint: pai_value(PaiMetric::CarbonFootprint),
            pai_04_fossil_fuel_exposure: pai_exposed(PaiMetric::FossilFuelExposure),
            pai_07_biodiversity_sensitive_areas: pai_value(PaiMetric::BiodiversitySensitiveAreas),
            pai_08_emissions_to_water: pai_value(PaiMetric::EmissionsToWater),
            pai_09_hazardous_waste: pai_value(PaiMetric::HazardousWaste),
            pai_12_gender_pay_gap: pai_value(PaiMetric::GenderPayGap),
            pai_13_board_gender_diversity: pai_value(PaiMetric::BoardGenderDiversity),
            pai_15_anti_corruption: pai_value(PaiMetric::AntiCorruption),
            pai_16_non_cooperative_tax: pai_exposed(PaiMetric::NonCooperativeTaxJurisdiction),
            pai_score: result.pai.summary_score(),
            pai_adverse: result.pai.adverse_count(),
            warnings: flags::warnings(&result.flags).count(),
            flags: result
                .flags
                .iter()
                .map(|flag| flag.code.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            input_hash: result.input_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDocument {
    pub index: usize,
    pub project_id: String,
    pub error: String,
}

/// Batch envelope: scored documents, failures and the generation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ScoredDocument>,
    pub failures: Vec<FailureDocument>,
}

impl BatchReport {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self::from_outcome_at(outcome, Utc::now())
    }

    pub fn from_outcome_at(outcome: &BatchOutcome, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            total: outcome.records.len(),
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            results: outcome.scored().map(ScoredDocument::from).collect(),
            failures: outcome
                .failures()
                .map(|(record, err)| FailureDocument {
                    index: record.index,
                    project_id: record.project_id.clone(),
                    error: err.to_string(),
                })
                .collect(),
        }
    }
}

pub fn rows(outcome: &BatchOutcome) -> Vec<ScoredRow> {
    outcome.scored().map(ScoredRow::from).collect()
}

pub fn write_rows_csv<W: Write>(writer: W, rows: &[ScoredRow]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_documents_json<W: Write>(
    writer: W,
    documents: &[ScoredDocument],
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, documents)?;
    Ok(())
}

pub fn write_report_json<W: Write>(writer: W, report: &BatchReport) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

fn dimension_keys(dimensions: &[Dimension]) -> Vec<String> {
    dimensions
        .iter()
        .map(|dimension| dimension.key().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringEngine;

    const CSV: &str = "\
project_id,country,sector,asset_class,investment_eur,ghg_intensity,gender_equality,social_factor,water_intensity,taxonomy_eligible
p-1, Germany ,Renewable Energy,Green Bond,12000000,0.05,0.65,0.7,0.1,yes
p-2,Kenya,Healthcare,Private Debt,,n/a,,,,
";

    #[test]
    fn csv_import_trims_and_treats_blanks_as_missing() {
        let records = read_records_csv(CSV.as_bytes()).expect("csv parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country.as_deref(), Some("Germany"));
        assert_eq!(records[0].investment_eur, Some(12_000_000.0));
        assert_eq!(records[0].taxonomy_eligible, Some(true));
        assert_eq!(records[1].investment_eur, None);
        assert_eq!(records[1].ghg_intensity, None);
        assert_eq!(records[1].csrd_in_scope, None);
    }

    #[test]
    fn json_import_accepts_single_object() {
        let records = read_records_json(
            r#"{"project_id": "solo", "country": "France", "sector": "Healthcare"}"#.as_bytes(),
        )
        .expect("json parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset_class, "");
    }

    #[test]
    fn csv_rows_have_one_line_per_scored_record() {
        let records = read_records_csv(CSV.as_bytes()).expect("csv parses");
        let outcome = ScoringEngine::default().score_batch(&records);

        let mut buffer = Vec::new();
        write_rows_csv(&mut buffer, &rows(&outcome)).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8");

        let mut lines = text.lines();
        let header = lines.next().expect("header");
        assert!(header.starts_with("project_id,composite,raw_band,band,social_veto"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn report_lists_failures_with_reason() {
        let mut broken = ProjectRecord::new("broken", "", "Healthcare", "Equity", 1.0e6);
        broken.country = None;
        let outcome = ScoringEngine::default().score_batch(&[broken]);

        let generated_at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        let report = BatchReport::from_outcome_at(&outcome, generated_at);

        assert_eq!(report.failed, 1);
        assert!(report.results.is_empty());
        assert!(report.failures[0].error.contains("broken"));

        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["generated_at"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn document_exposes_gate_details_as_plain_values() {
        let record = ProjectRecord::new("doc", "Germany", "Renewable Energy", "Green Bond", 2.0e6);
        let result = ScoringEngine::default().score(&record).expect("scores");
        let document = ScoredDocument::from(&result);

        let sfdr = document
            .gates
            .iter()
            .find(|gate| gate.framework == "SFDR")
            .expect("sfdr gate");
        assert_eq!(
            sfdr.detail.get("article"),
            document.sfdr_article.as_ref().map(|a| serde_json::json!(a)).as_ref()
        );
        assert_eq!(document.dimensions.len(), 8);
        assert_eq!(document.pai.len(), 10);
    }
}
