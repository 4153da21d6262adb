//! CLI entry point for the statistics dashboard processors.

use anyhow::{Result, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use statdash_processing::{
    DashboardConfig, DatasetReport, MultiSourceSurveyProcessor, OutlierMethod, ReportGenerator,
    TabularDatasetProcessor,
};
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible outlier method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierMethod {
    /// Interquartile range fence
    Iqr,
    /// Standard-score threshold
    Zscore,
}

impl From<CliOutlierMethod> for OutlierMethod {
    fn from(cli: CliOutlierMethod) -> Self {
        match cli {
            CliOutlierMethod::Iqr => OutlierMethod::Iqr,
            CliOutlierMethod::Zscore => OutlierMethod::Zscore,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistics dashboard data processing",
    long_about = "Cleans and summarizes the dashboard datasets.\n\n\
                  EXAMPLES:\n  \
                  # Companies summary with IQR outliers\n  \
                  statdash-processing companies --outliers iqr\n\n  \
                  # Sleep survey integration as JSON\n  \
                  statdash-processing --json sleep\n\n  \
                  # Custom data directory and report output\n  \
                  statdash-processing --data-dir ./data --emit-report ./outputs sleep"
)]
struct Cli {
    /// Directory holding the dataset files
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// JSON configuration file (overrides --data-dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long, global = true)]
    json: bool,

    /// Write a JSON report into this directory as <dataset>_report.json
    #[arg(short = 'r', long, global = true)]
    emit_report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process the companies dataset
    Companies(CompaniesArgs),
    /// Process the sleep survey sources
    Sleep(SleepArgs),
}

#[derive(ClapArgs, Debug)]
struct CompaniesArgs {
    /// Path to the companies CSV (defaults to the configured file)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Outlier detection method
    #[arg(long, value_enum)]
    outliers: Option<CliOutlierMethod>,

    /// Columns to check for outliers (defaults to all numeric columns)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Print the first N processed rows
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

#[derive(ClapArgs, Debug)]
struct SleepArgs {
    /// Print the first N integrated rows
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.json);
    check_output_flags(&cli)?;

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            DashboardConfig::from_json_file(path)?
        }
        None => DashboardConfig::from_data_dir(&cli.data_dir),
    };

    let result = match &cli.command {
        Command::Companies(args) => run_companies(&cli, args, &config),
        Command::Sleep(args) => run_sleep(&cli, args, &config),
    };

    if let Err(e) = &result {
        error!("Processing failed: {}", e);
    }
    result
}

/// `--preview` prints a table to stdout, which would corrupt `--json` output.
fn check_output_flags(cli: &Cli) -> Result<()> {
    let preview = match &cli.command {
        Command::Companies(args) => args.preview,
        Command::Sleep(args) => args.preview,
    };
    if cli.json && preview.is_some() {
        return Err(anyhow!("--preview cannot be combined with --json"));
    }
    Ok(())
}

fn run_companies(cli: &Cli, args: &CompaniesArgs, config: &DashboardConfig) -> Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.companies_file.clone());
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    let mut processor = TabularDatasetProcessor::new(config.companies.clone());
    info!("Loading dataset from: {}", input.display());
    processor.load(&input)?;
    processor.classify_columns()?;
    processor.clean_numeric()?;

    let summary = processor.summary_statistics()?;

    let masks = match args.outliers {
        Some(method) => {
            let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
            let selection = (!columns.is_empty()).then_some(columns.as_slice());
            processor.detect_outliers(selection, method.into())?
        }
        None => Vec::new(),
    };

    let report = DatasetReport::from_tabular("companies", &input, &processor, summary, &masks);
    let preview = args.preview.map(|n| processor.preview(n)).transpose()?;

    emit(cli, &report, preview)
}

fn run_sleep(cli: &Cli, args: &SleepArgs, config: &DashboardConfig) -> Result<()> {
    let mut processor = MultiSourceSurveyProcessor::new(config.sleep.clone());
    processor.load_all()?;
    processor.integrate()?;

    let summary = processor.summary_statistics()?;
    let report = DatasetReport::from_survey("sleep", &processor, summary);
    let preview = args.preview.map(|n| processor.preview(n)).transpose()?;

    emit(cli, &report, preview)
}

/// Write the report to stdout (and to disk when requested).
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn emit(cli: &Cli, report: &DatasetReport, preview: Option<DataFrame>) -> Result<()> {
    if let Some(dir) = &cli.emit_report {
        let generator = ReportGenerator::new(dir.clone());
        let path = generator.write_report_to_file(report, &report.dataset)?;
        info!("Report written to {}", path.display());
    }

    if cli.json {
        println!("{}", ReportGenerator::render_json(report)?);
        return Ok(());
    }

    println!("{}", ReportGenerator::render_text(report));
    if let Some(df) = preview {
        println!("{}", df);
    }

    Ok(())
}
