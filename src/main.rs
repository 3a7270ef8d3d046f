//! CLI entry point for the fleet modernity tool.
//!
//! Provides subcommands for producing the modernity report from an enriched
//! fleet CSV, exporting resolved records, and inspecting the rule tables.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fleet_modernity::analyzers::analyzer::{Pipeline, run_parallel};
use fleet_modernity::config::ReportConfig;
use fleet_modernity::output::{self, Cell, Format, RESOLVED_COLUMNS, resolved_cells};
use fleet_modernity::parser::open_fleet;
use fleet_modernity::record::Engine;
use fleet_modernity::rules::Subject;
use fleet_modernity::year::{YearBounds, YearEstimator};
use fleet_modernity::year::estimate::BUILTIN_TABLE_VERSION;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_modernity")]
#[command(about = "Fleet modernity index over an enriched fleet dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Csv => Format::Csv,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the report tables
    Report {
        /// Fleet CSV (plain or .gz)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory to write tables into
        #[arg(short, long, default_value = "report")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Gzip compress written tables
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// JSON report config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Minimum known-year aircraft for an airline to be scored
        #[arg(long)]
        min_sample: Option<u64>,

        /// Maximum number of chunks processed concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Write every record with its derived year, category and OEM columns
    Resolve {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Replacement estimator table (match,pattern,year)
        #[arg(long)]
        estimator_table: Option<PathBuf>,
    },
    /// Show how a single model key is estimated and classified
    Explain {
        #[arg(value_name = "MODEL_KEY")]
        model_key: String,

        #[arg(short, long)]
        manufacturer: Option<String>,

        #[arg(long)]
        as_of: Option<NaiveDate>,

        #[arg(long)]
        estimator_table: Option<PathBuf>,
    },
    /// List the estimator rules and check for unreachable ones
    Rules {
        #[arg(long)]
        estimator_table: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_modernity.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_modernity.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            output_dir,
            format,
            gzip,
            config,
            as_of,
            min_sample,
            concurrency,
        } => {
            let mut config = match config {
                Some(path) => ReportConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ReportConfig::default(),
            };
            if let Some(n) = min_sample {
                config.min_sample = n;
            }
            if let Some(n) = concurrency {
                config.concurrency = n;
            }
            config.validate()?;

            report(&input, &output_dir, format.into(), gzip, &config, as_of).await?;
        }
        Commands::Resolve {
            input,
            output,
            as_of,
            estimator_table,
        } => {
            let engine = engine(as_of, estimator_table.as_deref())?;
            resolve(&input, output.as_deref(), &engine)?;
        }
        Commands::Explain {
            model_key,
            manufacturer,
            as_of,
            estimator_table,
        } => {
            let engine = engine(as_of, estimator_table.as_deref())?;
            explain(&engine, &model_key, manufacturer.as_deref());
        }
        Commands::Rules { estimator_table } => {
            let estimator = estimator(estimator_table.as_deref())?;
            list_rules(&estimator)?;
        }
    }

    Ok(())
}

/// Bounds come from `--as-of` or today's UTC date, read once here.
fn engine(as_of: Option<NaiveDate>, estimator_table: Option<&Path>) -> Result<Engine> {
    let bounds = as_of.map_or_else(YearBounds::today, YearBounds::for_date);
    info!(min = bounds.min, max = bounds.max, "Year bounds");
    Ok(Engine::new(bounds, estimator(estimator_table)?))
}

fn estimator(table: Option<&Path>) -> Result<YearEstimator> {
    match table {
        Some(path) => YearEstimator::load(path)
            .with_context(|| format!("loading estimator table {}", path.display())),
        None => {
            info!(version = BUILTIN_TABLE_VERSION, "Using built-in estimator table");
            Ok(YearEstimator::builtin())
        }
    }
}

/// Runs the chunked pipeline over `input` and writes every report table.
#[tracing::instrument(skip(input, config), fields(input = %input.display()))]
async fn report(
    input: &Path,
    output_dir: &Path,
    format: Format,
    gzip: bool,
    config: &ReportConfig,
    as_of: Option<NaiveDate>,
) -> Result<()> {
    let engine = engine(as_of, config.estimator_table.as_deref())?;
    let pipeline = Arc::new(Pipeline::from_config(engine, config));

    let records = open_fleet(input)?.records();
    let report = run_parallel(pipeline, records, config.chunk_size, config.concurrency).await?;

    for (category, count) in &report.summary.by_category {
        info!(category = %category, count, "Category distribution");
    }
    for (oem, count) in &report.summary.by_oem {
        info!(oem = %oem, count, "OEM distribution");
    }

    let written = output::write_report(output_dir, &report, format, gzip)?;
    for path in &written {
        info!(path = %path.display(), "Wrote table");
    }

    Ok(())
}

/// Streams resolved records to CSV, one row per input row.
#[tracing::instrument(skip(input, engine), fields(input = %input.display()))]
fn resolve(input: &Path, output: Option<&Path>, engine: &Engine) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(RESOLVED_COLUMNS)?;

    let mut rows = 0u64;
    for record in open_fleet(input)?.records() {
        let resolved = engine.derive(record?);
        wtr.write_record(resolved_cells(&resolved).iter().map(Cell::to_csv))?;
        rows += 1;
    }
    wtr.flush()?;

    info!(rows, "Resolved records written");
    Ok(())
}

fn explain(engine: &Engine, model_key: &str, manufacturer: Option<&str>) {
    let key = model_key.trim();
    let estimator = engine.resolver().estimator();

    match estimator.rules().first_match(&Subject::model(Some(key))) {
        Some((index, year)) => {
            let rule = &estimator.rules().rules()[index];
            let in_bounds = engine.bounds().contains(*year);
            info!(
                model_key = key,
                rule = index,
                pattern = %rule.pattern.describe(),
                year,
                in_bounds,
                "Estimator match"
            );
        }
        None => info!(model_key = key, "No estimator rule matches"),
    }

    let category = engine.classifier().classify(Some(key), manufacturer);
    let oem = engine.oem_normalizer().normalize(manufacturer);
    info!(
        model_key = key,
        manufacturer = manufacturer.unwrap_or(""),
        category = %category,
        oem = fleet_modernity::classify::Oem::label_or_none(oem),
        "Classification"
    );
}

/// Lists the estimator rules in evaluation order; fails if any is unreachable.
fn list_rules(estimator: &YearEstimator) -> Result<()> {
    let rules = estimator.rules();
    for (index, rule) in rules.rules().iter().enumerate() {
        info!(
            index,
            field = ?rule.field,
            pattern = %rule.pattern.describe(),
            year = rule.outcome,
            "Rule"
        );
    }

    let shadowed = rules.shadowed();
    for s in &shadowed {
        warn!(
            earlier = s.earlier,
            later = s.later,
            earlier_pattern = %rules.rules()[s.earlier].pattern.describe(),
            later_pattern = %rules.rules()[s.later].pattern.describe(),
            "Rule can never match"
        );
    }

    info!(rules = rules.len(), shadowed = shadowed.len(), "Rule check complete");
    if !shadowed.is_empty() {
        bail!("{} unreachable estimator rule(s)", shadowed.len());
    }
    Ok(())
}
