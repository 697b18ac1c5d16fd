//! CLI entry point for the TMDb insights tool.
//!
//! Every subcommand loads the movie table, runs the cleaning pipeline and
//! then answers one query (or the whole fixed report) over the result.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tmdb_insights::analyzers::aggregate::{
    Comparison, Extremum, extremum, filter_by_threshold, frequency_count, mean,
};
use tmdb_insights::analyzers::analyzer::{analyze, chart_series};
use tmdb_insights::analyzers::describe::describe;
use tmdb_insights::cleaner::{CleaningSummary, PROFIT, clean};
use tmdb_insights::config::AnalysisConfig;
use tmdb_insights::loader::{REQUIRED_COLUMNS, load_path, require_columns};
use tmdb_insights::output::{render_report, to_json, write_chart_data, write_table};
use tmdb_insights::table::Table;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_INPUT: &str = "tmdb-movies.csv";

#[derive(Parser)]
#[command(name = "tmdb_insights")]
#[command(about = "Clean the TMDb movie table and answer aggregate questions about it", long_about = None)]
struct Cli {
    /// CSV or .csv.gz file to analyze (defaults to $TMDB_DATA_PATH, then tmdb-movies.csv)
    #[arg(short, long, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON file overriding the analysis defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer every fixed research question
    Report {
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the cleaned table as CSV
    Clean {
        #[arg(short, long)]
        output: PathBuf,

        /// Gzip compress the output
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Print the movie with the highest or lowest value of a column
    Extremum {
        #[arg(short, long)]
        column: String,

        #[arg(short, long, value_enum)]
        kind: Kind,
    },
    /// Print the average of a column, ignoring missing values
    Mean {
        #[arg(short, long)]
        column: String,

        /// Only consider movies with at least this profit
        #[arg(long)]
        min_profit: Option<i64>,
    },
    /// Count the values of a pipe-delimited column such as genres or cast
    Frequency {
        #[arg(short, long)]
        column: String,

        /// Only print the N most frequent values
        #[arg(short, long)]
        top: Option<usize>,

        /// Only consider movies with at least this profit
        #[arg(long)]
        min_profit: Option<i64>,
    },
    /// Print count, mean, std, min and max of every numeric column
    Describe,
    /// Write the series behind each chart as CSV files
    ChartData {
        #[arg(short = 'd', long, default_value = "charts")]
        output_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Min,
    Max,
}

impl From<Kind> for Extremum {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Min => Extremum::Min,
            Kind::Max => Extremum::Max,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/tmdb_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tmdb_insights.log"));

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

    let input = cli
        .input
        .or_else(|| std::env::var_os("TMDB_DATA_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let (table, summary) = load_clean(&input, &config)?;

    match cli.command {
        Commands::Report { format, output } => {
            let report = analyze(&table, summary, &config.report)?;
            let rendered = match format {
                Format::Pretty => render_report(&report),
                Format::Json => to_json(&report)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!(path = %path.display(), "Report written");
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Clean { output, gzip } => {
            write_table(&output, &table, gzip)?;
        }
        Commands::Extremum { column, kind } => {
            let row = extremum(&table, &column, kind.into())?;
            println!("{}", to_json(&row)?);
        }
        Commands::Mean { column, min_profit } => {
            let subset = profitable(table, min_profit)?;
            println!("{}", mean(&subset, &column)?);
        }
        Commands::Frequency {
            column,
            top,
            min_profit,
        } => {
            let subset = profitable(table, min_profit)?;
            let mut counts = frequency_count(&subset, &column, config.report.separator)?;
            if let Some(n) = top {
                counts.truncate(n);
            }
            for entry in counts {
                println!("{}\t{}", entry.token, entry.count);
            }
        }
        Commands::Describe => {
            println!(
                "{:<16} {:>8} {:>16} {:>16} {:>16} {:>16}",
                "column", "count", "mean", "std", "min", "max"
            );
            for s in describe(&table) {
                println!(
                    "{:<16} {:>8} {:>16.2} {:>16.2} {:>16.2} {:>16.2}",
                    s.column, s.count, s.mean, s.std, s.min, s.max
                );
            }
        }
        Commands::ChartData { output_dir } => {
            let series = chart_series(&table, &config.report)?;
            for path in write_chart_data(&output_dir, &series)? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Loads `input`, checks the required columns and runs the cleaning pipeline.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
fn load_clean(input: &Path, config: &AnalysisConfig) -> Result<(Table, CleaningSummary)> {
    let table = load_path(input)?;
    require_columns(&table, REQUIRED_COLUMNS)?;
    Ok(clean(table, &config.cleaning)?)
}

/// Narrows the table to movies with at least `min_profit`, if given.
fn profitable(table: Table, min_profit: Option<i64>) -> Result<Table> {
    match min_profit {
        Some(threshold) => Ok(filter_by_threshold(
            &table,
            PROFIT,
            Comparison::AtLeast,
            threshold as f64,
        )?),
        None => Ok(table),
    }
}
