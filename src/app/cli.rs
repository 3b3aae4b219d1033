//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gaze Analyzer - classify gaze streams into movement events and risk scores
#[derive(Parser, Debug)]
#[command(name = "gaze-analyzer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a CSV file of raw gaze samples
    Analyze {
        /// Input CSV with columns: x, y, timestamp_ms
        #[arg(short, long)]
        input: PathBuf,

        /// Character count of the text that was read (reading-speed estimate)
        #[arg(short, long, default_value = "0")]
        text_length: usize,

        /// Write the full recording (samples + events) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recording name stored in the output metadata
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Re-analyze a saved recording with the current configuration
    Replay {
        /// Input recording JSON
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Fit the screen calibration from a CSV of gaze/target pairs
    Calibrate {
        /// Input CSV with columns: x, y, timestamp_ms, target_x, target_y
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
