use crate::cli::ConfigArgs;
use crate::render;
use clap::Args;
use idris::error::AppError;
use idris::export::{write_report_json, BatchReport};
use idris::scoring::{BatchOutcome, ProjectRecord, ScoringEngine};
use std::io;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the batch report as JSON instead of the text walkthrough
    #[arg(long)]
    pub(crate) json: bool,
    /// Print the full breakdown for every scored project
    #[arg(long)]
    pub(crate) detailed: bool,
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
}

pub(crate) fn run_demo(engine: &ScoringEngine, args: DemoArgs) -> Result<(), AppError> {
    let outcome = engine.score_batch(&demo_portfolio());

    if args.json {
        write_report_json(io::stdout().lock(), &BatchReport::from_outcome(&outcome))?;
        println!();
        return Ok(());
    }

    println!("IDRIS sample portfolio");
    for line in portfolio_table(&outcome) {
        println!("{line}");
    }

    if args.detailed {
        for result in outcome.scored() {
            println!("\n{}", render::result_summary(result));
        }
    }

    Ok(())
}

/// A small mixed portfolio: a disclosed EU project, proxied and vetoed records and one
/// record that cannot be scored.
pub(crate) fn demo_portfolio() -> Vec<ProjectRecord> {
    let mut orphan = ProjectRecord::new("orphan-06", "", "Healthcare", "Equity", 1_000_000.0);
    orphan.country = None;

    vec![
        ProjectRecord::new(
            "solar-de-01",
            "Germany",
            "Renewable Energy",
            "Green Bond",
            12_000_000.0,
        )
        .with_csrd_in_scope(true)
        .with_ghg_intensity(0.05)
        .with_gender_equality(0.65)
        .with_social_factor(0.70)
        .with_water_intensity(0.10),
        ProjectRecord::new("clinic-ke-02", "Kenya", "Healthcare", "Private Debt", 3_500_000.0)
            .with_ghg_intensity(0.22)
            .with_gender_equality(0.72)
            .with_social_factor(0.82),
        ProjectRecord::new("mine-ng-03", "Nigeria", "Extractive Industry", "Equity", 25_000_000.0)
            .with_ghg_intensity(0.85)
            .with_gender_equality(0.20)
            .with_social_factor(0.30)
            .with_water_intensity(0.60),
        ProjectRecord::new(
            "housing-fr-04",
            "France",
            "Affordable Housing",
            "Project Finance",
            8_000_000.0,
        )
        .with_gender_equality(0.55)
        .with_water_intensity(0.15),
        ProjectRecord::new("fintech-xx-05", "Atlantis", "Financial Inclusion", "Equity", 900_000.0)
            .with_ghg_intensity(0.10)
            .with_gender_equality(0.70)
            .with_social_factor(0.80)
            .with_water_intensity(0.05),
        orphan,
    ]
}

fn portfolio_table(outcome: &BatchOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<16} {:>9}  {:<11} {:<11} {:<8} {}",
        "project", "composite", "band", "sfdr", "veto", "proxies"
    )];
    for record in &outcome.records {
        match &record.result {
            Ok(result) => lines.push(format!(
                "{:<16} {:>9.1}  {:<11} {:<11} {:<8} {}",
                result.project_id,
                result.composite.presented(),
                result.band().label(),
                result
                    .sfdr_article()
                    .map(|article| article.label())
                    .unwrap_or("-"),
                if result.veto.is_triggered() { "yes" } else { "no" },
                result.notes.len()
            )),
            Err(err) => lines.push(format!("{:<16} not scored: {err}", record.project_id)),
        }
    }
    lines.push(format!(
        "{} scored, {} failed",
        outcome.succeeded, outcome.failed
    ));
    lines
}
