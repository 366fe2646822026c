use anyhow::{Context, Result};
use burnsub::config::Config;
use burnsub::subtitle::output_path_for;
use burnsub::{generate_subtitles, print_summary, RunState, Stage, StageWeights};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const PROGRESS_STEPS: u64 = 1000;

#[derive(Parser)]
#[command(name = "burnsub")]
#[command(version, about = "Translated subtitles for on-screen video text")]
#[command(
    long_about = "Sample frames from a video, recognize burned-in text with Google Gemini, translate it, and write a positioned .ass subtitle track."
)]
struct Cli {
    /// Input video file
    input: PathBuf,

    /// Output subtitle file (defaults to <input>.<lang>.ass)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g., vi, en, ja)
    #[arg(short, long)]
    lang: Option<String>,

    /// Frames sampled per second of video
    #[arg(short, long)]
    rate: Option<f64>,

    /// Number of concurrent recognition requests
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Gemini model name
    #[arg(short, long)]
    model: Option<String>,

    /// JPEG quality of sampled frames (2 = best, 31 = worst)
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("burnsub={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(PROGRESS_STEPS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(lang) = cli.lang {
        config.target_language = lang;
    }
    if let Some(rate) = cli.rate {
        config.capture_rate = rate;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(quality) = cli.jpeg_quality {
        config.jpeg_quality = quality;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let output = cli
        .output
        .unwrap_or_else(|| output_path_for(&cli.input, &config.target_language));

    info!("Input:    {}", cli.input.display());
    info!("Output:   {}", output.display());
    info!("Language: {}", config.target_language);
    info!("Rate:     {} frames/s", config.capture_rate);
    info!("Model:    {}", config.model);

    let weights = StageWeights::default();
    let pb = progress_bar();
    let on_progress = |stage: Stage, fraction: f64| {
        let overall = weights.overall(stage, fraction);
        pb.set_position((overall * PROGRESS_STEPS as f64).round() as u64);
        pb.set_message(RunState::InProgress(stage).to_string());
    };

    let result = generate_subtitles(&cli.input, &output, &config, &on_progress).await;

    match result {
        Ok(result) => {
            pb.finish_with_message(RunState::Completed.to_string());
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message(RunState::Failed(e.to_string()).to_string());
            Err(e).context("Subtitle generation failed")
        }
    }
}
