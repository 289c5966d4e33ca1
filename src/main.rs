//! CLI entry point for the listing heatmap tool.
//!
//! Provides subcommands for generating heatmap GeoJSON from scraper extracts
//! and for inspecting what the pipeline keeps at each stage.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use listing_heatmap::filter::FilterParams;
use listing_heatmap::heatmap::generate_from_sources;
use listing_heatmap::output::{print_json, print_summary, write_result};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "listing_heatmap")]
#[command(about = "A tool to build price-per-sqm heatmaps from real-estate listing extracts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Minimum room count
    #[arg(long, default_value_t = 1)]
    min_rooms: u32,

    /// Maximum room count
    #[arg(long, default_value_t = 8)]
    max_rooms: u32,

    /// Minimum surface in square meters
    #[arg(long, default_value_t = 20.0)]
    min_size: f64,

    /// Maximum surface in square meters
    #[arg(long, default_value_t = 500.0)]
    max_size: f64,
}

impl From<&FilterArgs> for FilterParams {
    fn from(args: &FilterArgs) -> Self {
        FilterParams {
            min_rooms: args.min_rooms,
            max_rooms: args.max_rooms,
            min_size: args.min_size,
            max_size: args.max_size,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate heatmap GeoJSON from one or more CSV extracts
    Generate {
        /// Paths to files or URLs to fetch
        #[arg(value_name = "FILE_OR_URL", num_args = 1..)]
        sources: Vec<String>,

        /// JSON file to write the result to
        #[arg(short, long, default_value = "heatmap.json")]
        output: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Run the pipeline and log stage counts without writing a file
    Inspect {
        /// Paths to files or URLs to fetch
        #[arg(value_name = "FILE_OR_URL", num_args = 1..)]
        sources: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/listing_heatmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("listing_heatmap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            sources,
            output,
            filters,
        } => {
            let result = run_pipeline(&sources, &FilterParams::from(&filters))?;
            write_result(&output, &result)?;
            print_summary(&result);
        }
        Commands::Inspect { sources, filters } => {
            let result = run_pipeline(&sources, &FilterParams::from(&filters))?;
            print_json(&result)?;
        }
    }

    Ok(())
}

/// Fetches every source, then runs the pipeline on the concatenated records.
fn run_pipeline(
    sources: &[String],
    params: &FilterParams,
) -> Result<listing_heatmap::output::HeatmapResult> {
    let start = std::time::Instant::now();

    let mut buffers = Vec::with_capacity(sources.len());
    for source in sources {
        buffers.push(fetcher(source)?);
    }

    let result = generate_from_sources(buffers.iter().map(Vec::as_slice), params)?;

    info!(
        sources = sources.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Pipeline finished"
    );
    Ok(result)
}

/// Loads extract bytes from a local file path or fetches them over HTTP.
#[tracing::instrument(fields(source = %source))]
fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let response = reqwest::blocking::get(source)?.error_for_status()?;
        response.bytes()?.to_vec()
    } else {
        std::fs::read(source)?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
