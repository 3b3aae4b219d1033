//! Gaze Analyzer CLI
//!
//! Offline front end for the gaze classification pipeline: analyze CSV
//! sample dumps, replay saved recordings, and fit screen calibrations.

use std::path::{Path, PathBuf};

use gaze_analyzer::app::cli::{Cli, Commands, ConfigAction};
use gaze_analyzer::app::config::Config;
use gaze_analyzer::session::recording::SessionRecording;
use gaze_analyzer::session::GazeSession;
use gaze_analyzer::tracking::types::GazeSample;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// One row of a raw sample CSV
#[derive(Debug, Deserialize)]
struct SampleRow {
    x: f64,
    y: f64,
    timestamp_ms: f64,
}

/// One row of a calibration CSV
#[derive(Debug, Deserialize)]
struct CalibrationRow {
    x: f64,
    y: f64,
    timestamp_ms: f64,
    target_x: f64,
    target_y: f64,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            text_length,
            output,
            name,
        } => {
            run_analyze(&input, text_length, output, name, &config)?;
        }
        Commands::Replay { input } => {
            run_replay(&input, &config)?;
        }
        Commands::Calibrate { input } => {
            run_calibrate(&input, &config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn read_samples(path: &Path) -> anyhow::Result<Vec<GazeSample>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut samples = Vec::new();
    for row in reader.deserialize() {
        let row: SampleRow = row?;
        samples.push(GazeSample::new(row.x, row.y, row.timestamp_ms));
    }
    info!(count = samples.len(), path = %path.display(), "samples loaded");
    Ok(samples)
}

fn run_analyze(
    input: &Path,
    text_length: usize,
    output: Option<PathBuf>,
    name: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let samples = read_samples(input)?;
    if samples.is_empty() {
        warn!("input contains no samples");
        return Ok(());
    }

    let recording_name = name.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string())
    });

    let mut session = GazeSession::new(config);
    let mut recording = SessionRecording::new(recording_name, Some(text_length));
    for sample in &samples {
        session.process_sample(*sample)?;
        recording.add_sample(*sample);
    }
    session.finish();
    recording.finalize(session.events());

    print_report(&session, text_length);

    if let Some(path) = output {
        recording.save(&path)?;
        println!("Recording written to {}", path.display());
    }
    Ok(())
}

fn run_replay(input: &Path, config: &Config) -> anyhow::Result<()> {
    let recording = SessionRecording::load(input)?;
    info!(
        name = %recording.metadata.name,
        samples = recording.samples.len(),
        "replaying recording"
    );
    let session = recording.replay(config)?;
    print_report(&session, recording.metadata.text_length.unwrap_or(0));
    Ok(())
}

fn run_calibrate(input: &Path, config: &Config) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(input)?;
    let mut session = GazeSession::new(config);
    session.begin_calibration();

    let mut count = 0usize;
    for row in reader.deserialize() {
        let row: CalibrationRow = row?;
        session.add_calibration_point(
            GazeSample::new(row.x, row.y, row.timestamp_ms),
            row.target_x,
            row.target_y,
        )?;
        count += 1;
    }

    match session.end_calibration() {
        Ok(()) => {
            println!("Calibration trained from {} points.", count);
        }
        Err(e) => {
            println!("Calibration failed: {e}");
            println!("Collect more (or better spread) points and retry.");
        }
    }
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let path = Config::default_path();
    if path.exists() && !force {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    config.save(&path)?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Reset { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                println!("Refusing to reset existing config without --force");
                return Ok(());
            }
            Config::default().save(&path)?;
            println!("Config reset to defaults at {}", path.display());
        }
    }
    Ok(())
}

fn print_report(session: &GazeSession, text_length: usize) {
    let metrics = session.metrics();
    println!("Events: {}", session.events().len());
    println!("  fixations:  {}", metrics.fixation_count);
    println!("  saccades:   {}", metrics.saccade_count);
    println!("  psos:       {}", metrics.pso_count);
    println!("  glissades:  {}", metrics.glissade_count);
    println!(
        "  regressions: {} ({:.1}% of saccades)",
        metrics.regression_count, metrics.regression_rate
    );
    println!(
        "Avg fixation duration: {:.1} ms",
        metrics.average_fixation_duration_ms
    );
    println!(
        "Avg saccade amplitude: {:.2} deg",
        metrics.average_saccade_amplitude
    );
    println!(
        "Total reading time:    {:.0} ms",
        metrics.total_reading_time_ms
    );

    let score = session.score(text_length);
    println!();
    println!(
        "Risk: {} (probability {:.2})",
        score.risk_level, score.probability
    );
    for note in &score.clinical_notes {
        println!("  - {note}");
    }
}
