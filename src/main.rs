//! CLI entry point for the cyclist accident pipeline.
//!
//! Run the subcommands in order: `fetch` downloads the yearly TfL accident
//! statistics, `filter` keeps the accidents involving cyclists, and
//! `display` plots them. `weights` builds a severity-weighted hotspot grid
//! from the filtered accidents.

mod display;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cyclist_accidents::{
    config::{
        DEFAULT_ACCIDENTS_DIR, DEFAULT_END_YEAR, DEFAULT_MARKER_SIZE, DEFAULT_OUTPUT_FILE,
        DEFAULT_START_YEAR, PipelineConfig,
    },
    fetch::{BasicClient, DEFAULT_BASE_URL, FetchOptions, RetryPolicy, fetch_years},
    filter::run_filter,
    output::{print_coordinates, read_accidents, write_json_pretty},
    weights::{DEFAULT_CELL_SIZE, WeightIndex},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cyclist_accidents")]
#[command(about = "Download, filter and plot London cyclist accidents", long_about = None)]
struct Cli {
    /// First year to process
    #[arg(long, global = true, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,

    /// Last year to process (inclusive)
    #[arg(long, global = true, default_value_t = DEFAULT_END_YEAR)]
    end_year: i32,

    /// Directory holding one `{year}.json` file per year
    #[arg(long, global = true, default_value = DEFAULT_ACCIDENTS_DIR)]
    accidents_dir: PathBuf,

    /// Filtered `[lat, lon, severity]` file
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the raw accident statistics for every year
    Fetch {
        /// API root the `/AccidentStats/{year}` path is appended to
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Extra attempts per year after a failed request
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Delay before the first retry, doubled on each further retry
        #[arg(long, default_value_t = 500)]
        backoff_ms: u64,

        /// Per-request timeout; requests wait indefinitely when unset
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Keep accidents with a cyclist casualty and write them to the output file
    Filter,
    /// Print and plot the filtered accidents
    Display {
        /// Marker area in square pixels
        #[arg(long, default_value_t = DEFAULT_MARKER_SIZE)]
        marker_size: f64,
    },
    /// Build a severity-weighted grid of accident hotspots
    Weights {
        /// Grid cell edge in degrees
        #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
        cell_size: f64,

        /// Number of hotspots to log
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Where to write the full grid
        #[arg(long, default_value = "weights.json")]
        weights_output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();
    let mut config = PipelineConfig {
        start_year: cli.start_year,
        end_year: cli.end_year,
        accidents_dir: cli.accidents_dir,
        output_file: cli.output,
        ..PipelineConfig::default()
    };

    match cli.command {
        Commands::Fetch {
            base_url,
            retries,
            backoff_ms,
            timeout_secs,
        } => {
            let options = FetchOptions {
                base_url,
                retry: RetryPolicy::new(retries, Duration::from_millis(backoff_ms)),
            };
            let client = BasicClient::with_timeout(timeout_secs.map(Duration::from_secs))?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let mut stdout = std::io::stdout().lock();
            runtime.block_on(fetch_years(&client, &config, &options, &mut stdout))?;
        }
        Commands::Filter => {
            let report = run_filter(&config, &mut std::io::stdout().lock())?;
            for (year, kept) in &report.kept_per_year {
                debug!(year, kept, "Cyclist accidents per year");
            }
            if report.malformed > 0 {
                warn!(
                    malformed = report.malformed,
                    "Skipped records that could not be read"
                );
            }
            info!(
                kept = report.kept,
                scanned = report.scanned,
                pct_kept = report.pct_kept(),
                output = %config.output_file.display(),
                "Cyclist accidents saved"
            );
        }
        Commands::Display { marker_size } => {
            config.marker_size = marker_size;
            config.validate()?;

            let accidents = read_accidents(&config.output_file)?;
            print_coordinates(&mut std::io::stdout().lock(), &accidents)?;
            display::show(&accidents, config.marker_size)?;
        }
        Commands::Weights {
            cell_size,
            top,
            weights_output,
        } => {
            anyhow::ensure!(
                cell_size.is_finite() && cell_size > 0.0,
                "cell size must be positive, got {cell_size}"
            );

            let accidents = read_accidents(&config.output_file)?;
            let index = WeightIndex::from_accidents(&accidents, cell_size);
            info!(
                accidents = accidents.len(),
                cells = index.len(),
                total_weight = index.total_weight(),
                "Weight grid built"
            );
            index.log_hottest(top);

            write_json_pretty(&weights_output, &index.report())
                .context("saving weight grid")?;
            info!(path = %weights_output.display(), "Weight grid saved");
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/cyclist_accidents.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cyclist_accidents.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

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

    Ok(file_guard)
}
