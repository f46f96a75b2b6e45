//! CLI entry point: correlate state obesity prevalence with state integrity
//! scores and draw three choropleth maps.
//!
//! Runs once to completion. With no flags it reads the published CDC and
//! State Integrity sources and writes PNG maps to the working directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use obesity_integrity::config::{
    self, INTEGRITY_URL, OBESITY_CSV_PATH, OBESITY_URL, PipelineConfig, RenderMode,
};
use obesity_integrity::fetch::BasicClient;
use obesity_integrity::pipeline::run;
use obesity_integrity::render::{PngSink, TerminalSink};
use obesity_integrity::stats::DEFAULT_SIGNIFICANCE_LEVEL;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "obesity_integrity")]
#[command(
    about = "Correlate adult obesity prevalence with state integrity scores",
    long_about = None
)]
struct Cli {
    /// CSV of adult obesity prevalence by state
    #[arg(long, default_value = OBESITY_URL)]
    obesity_url: String,

    /// JSON overview of state integrity scores
    #[arg(long, default_value = INTEGRITY_URL)]
    integrity_url: String,

    /// Where the downloaded CSV is saved (and reused if a later download fails)
    #[arg(long, default_value = OBESITY_CSV_PATH)]
    csv_path: PathBuf,

    /// Directory for the map images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Save PNG images or draw the maps in the terminal
    #[arg(short, long, value_enum, default_value_t = RenderMode::Png)]
    mode: RenderMode,

    /// Image width in pixels
    #[arg(long, default_value_t = config::IMAGE_WIDTH)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = config::IMAGE_HEIGHT)]
    height: u32,

    /// Optional: also write the merged table to this CSV file
    #[arg(long)]
    merged_output: Option<PathBuf>,

    /// p-value threshold for the significance verdict
    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE_LEVEL)]
    significance_level: f64,
}

impl From<Cli> for PipelineConfig {
    fn from(cli: Cli) -> Self {
        PipelineConfig {
            obesity_url: cli.obesity_url,
            integrity_url: cli.integrity_url,
            csv_path: cli.csv_path,
            output_dir: cli.output_dir,
            mode: cli.mode,
            width: cli.width,
            height: cli.height,
            merged_output: cli.merged_output,
            significance_level: cli.significance_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/obesity_integrity.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("obesity_integrity.log"));

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

    let config = PipelineConfig::from(Cli::parse());
    info!(mode = ?config.mode, output_dir = %config.output_dir.display(), "Starting run");

    let client = BasicClient::new();
    let mut stdout = std::io::stdout();

    match config.mode {
        RenderMode::Png => {
            let mut sink = PngSink::new(&config.output_dir, config.width, config.height);
            run(&client, &config, &mut sink, &mut stdout)
                .await
                .context("pipeline failed")?;
            if !sink.written().is_empty() {
                println!("All plots have been saved as PNG files.");
            }
        }
        RenderMode::Terminal => {
            let mut sink = TerminalSink::new(std::io::stdout());
            run(&client, &config, &mut sink, &mut stdout)
                .await
                .context("pipeline failed")?;
        }
    }

    Ok(())
}
