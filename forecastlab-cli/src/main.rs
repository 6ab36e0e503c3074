//! ForecastLab CLI — reconcile price forecasts against realized prices.
//!
//! Commands:
//! - `reconcile` — ranked forecasts, actuals and deltas per period in the window
//! - `revisions` — how each period's forecast moved across late issuances

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use forecastlab_runner::{
    export_revisions_csv, export_revisions_json, export_rows_csv, export_rows_json,
    render_revisions_table, render_summary, render_table, run_reconciliation, run_revisions,
    ReconcileConfig,
};

#[derive(Parser)]
#[command(
    name = "forecastlab",
    about = "ForecastLab CLI — rolling forecast reconciliation"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile forecasts with actuals over the trailing window.
    Reconcile {
        #[command(flatten)]
        source: SourceArgs,

        /// Ranked forecasts per period.
        #[arg(long)]
        ranks: Option<usize>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Print accuracy and skip summary after the table.
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    /// Show issuance revisions close to each period.
    Revisions {
        #[command(flatten)]
        source: SourceArgs,

        /// Only issuances made at most this many hours before the period.
        #[arg(long)]
        horizon_hours: Option<i64>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Forecast CSV (overrides the config).
    #[arg(long)]
    forecasts: Option<PathBuf>,

    /// Actual-price CSV (overrides the config).
    #[arg(long)]
    actuals: Option<PathBuf>,

    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long)]
    now: Option<String>,

    /// Trailing window length in hours.
    #[arg(long)]
    window_hours: Option<i64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Reconcile {
            source,
            ranks,
            format,
            summary,
        } => {
            let mut config = build_config(source)?;
            if let Some(k) = ranks {
                config.reconcile.ranks = k;
            }
            run_reconcile_cmd(&config, format, summary)
        }
        Commands::Revisions {
            source,
            horizon_hours,
            format,
        } => {
            let mut config = build_config(source)?;
            if let Some(h) = horizon_hours {
                config.issuance.horizon_hours = h;
            }
            run_revisions_cmd(&config, format)
        }
    }
}

/// Logs go to stderr so stdout only carries the rendered output.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid --log-level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Merge the config file (if any) with command-line overrides.
fn build_config(args: SourceArgs) -> Result<ReconcileConfig> {
    let mut config = match (&args.config, &args.forecasts, &args.actuals) {
        (Some(path), _, _) => ReconcileConfig::from_file(path)?,
        (None, Some(f), Some(a)) => ReconcileConfig::for_sources(f, a),
        (None, _, _) => bail!("either --config or both --forecasts and --actuals are required"),
    };

    if let Some(f) = args.forecasts {
        config.source.forecasts = f;
    }
    if let Some(a) = args.actuals {
        config.source.actuals = a;
    }
    if let Some(now) = args.now.as_deref() {
        let parsed = DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("invalid --now '{now}', expected RFC 3339"))?;
        config.reconcile.now = Some(parsed.with_timezone(&Utc));
    }
    if let Some(h) = args.window_hours {
        config.reconcile.window_hours = h;
        config.reconcile.window_secs = None;
    }
    Ok(config)
}

fn run_reconcile_cmd(config: &ReconcileConfig, format: Format, summary: bool) -> Result<()> {
    let run = run_reconciliation(config)?;

    match format {
        Format::Table => print!("{}", render_table(&run.rows, run.k)),
        Format::Csv => print!("{}", export_rows_csv(&run.rows, run.k)?),
        Format::Json => println!("{}", export_rows_json(&run)?),
    }
    if summary {
        println!();
        print!("{}", render_summary(&run));
    }
    Ok(())
}

fn run_revisions_cmd(config: &ReconcileConfig, format: Format) -> Result<()> {
    let run = run_revisions(config)?;

    match format {
        Format::Table => print!("{}", render_revisions_table(&run)),
        Format::Csv => print!("{}", export_revisions_csv(&run)?),
        Format::Json => println!("{}", export_revisions_json(&run)?),
    }
    Ok(())
}
