use crate::demo::{run_demo, DemoArgs};
use crate::render;
use clap::{Args, Parser, Subcommand, ValueEnum};
use idris::config::AppConfig;
use idris::error::AppError;
use idris::export::{
    self, read_records_csv, read_records_json, write_report_json, write_rows_csv, BatchReport,
    ScoredDocument,
};
use idris::scoring::{ProjectRecord, ScoringEngine};
use idris::telemetry;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "idris",
    about = "Score impact investments and check them against EU sustainable-finance rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a single project described on the command line
    Score(ScoreArgs),
    /// Score every record in a CSV or JSON file
    Batch(BatchArgs),
    /// Inspect engine configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Score a built-in sample portfolio
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file and print the effective methodology
    Check(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    /// Engine configuration file (overrides IDRIS_ENGINE_CONFIG)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[arg(long, default_value = "cli")]
    project_id: String,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    sector: Option<String>,
    #[arg(long, default_value = "")]
    asset_class: String,
    #[arg(long)]
    investment_eur: Option<f64>,
    /// Reported CSRD scope (true/false); proxied from size, country and sector when omitted
    #[arg(long)]
    csrd_in_scope: Option<bool>,
    /// tCO2e intensity as a 0-1 fraction
    #[arg(long)]
    ghg_intensity: Option<f64>,
    #[arg(long)]
    gender_equality: Option<f64>,
    #[arg(long)]
    social_factor: Option<f64>,
    #[arg(long)]
    water_intensity: Option<f64>,
    #[arg(long)]
    taxonomy_eligible: Option<bool>,
    /// Externally assessed governance score (0-100)
    #[arg(long)]
    governance_score: Option<f64>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    config: ConfigArgs,
}

impl ScoreArgs {
    fn record(&self) -> ProjectRecord {
        ProjectRecord {
            project_id: self.project_id.clone(),
            country: self.country.clone(),
            sector: self.sector.clone(),
            asset_class: self.asset_class.clone(),
            investment_eur: self.investment_eur,
            csrd_in_scope: self.csrd_in_scope,
            ghg_intensity: self.ghg_intensity,
            gender_equality: self.gender_equality,
            social_factor: self.social_factor,
            water_intensity: self.water_intensity,
            taxonomy_eligible: self.taxonomy_eligible,
            governance_score: self.governance_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Records to score; `.json` files are read as JSON, anything else as CSV
    #[arg(long)]
    input: PathBuf,
    /// Destination file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    #[command(flatten)]
    config: ConfigArgs,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let app_config = AppConfig::load()?;
    telemetry::init(&app_config.telemetry)?;

    match cli.command {
        Command::Score(args) => {
            let engine = engine(&app_config, args.config.config.as_deref())?;
            run_score(&engine, &args)
        }
        Command::Batch(args) => {
            let engine = engine(&app_config, args.config.config.as_deref())?;
            run_batch(&engine, &args)
        }
        Command::Config {
            command: ConfigCommand::Check(args),
        } => {
            let engine = engine(&app_config, args.config.as_deref())?;
            println!("{}", render::config_summary(&engine));
            Ok(())
        }
        Command::Demo(args) => {
            let engine = engine(&app_config, args.config.config.as_deref())?;
            run_demo(&engine, args)
        }
    }
}

fn engine(app_config: &AppConfig, override_path: Option<&Path>) -> Result<ScoringEngine, AppError> {
    let config = app_config.engine_config(override_path)?;
    Ok(ScoringEngine::new(config)?)
}

fn run_score(engine: &ScoringEngine, args: &ScoreArgs) -> Result<(), AppError> {
    let result = engine.score(&args.record())?;
    if args.json {
        let document = ScoredDocument::from(&result);
        let stdout = io::stdout();
        export::write_documents_json(stdout.lock(), std::slice::from_ref(&document))?;
        println!();
    } else {
        println!("{}", render::result_summary(&result));
    }
    Ok(())
}

fn run_batch(engine: &ScoringEngine, args: &BatchArgs) -> Result<(), AppError> {
    let reader = BufReader::new(File::open(&args.input)?);
    let records = if is_json(&args.input) {
        read_records_json(reader)?
    } else {
        read_records_csv(reader)?
    };
    info!(input = %args.input.display(), records = records.len(), "scoring batch");

    let outcome = engine.score_batch(&records);
    for (record, err) in outcome.failures() {
        eprintln!("record {} skipped: {err}", record.index + 1);
    }

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    match args.format {
        OutputFormat::Csv => write_rows_csv(writer, &export::rows(&outcome))?,
        OutputFormat::Json => write_report_json(writer, &BatchReport::from_outcome(&outcome))?,
    }

    eprintln!("{} scored, {} failed", outcome.succeeded, outcome.failed);
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
