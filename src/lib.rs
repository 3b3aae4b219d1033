//! # Gaze Analyzer
//!
//! A gaze signal-processing and classification engine that turns a stream of
//! raw 2-D gaze samples from an external eye-tracking source into clinically
//! interpretable eye-movement events and risk indicators.
//!
//! ## Overview
//!
//! The host application pushes raw `(x, y, timestamp)` samples into a
//! [`GazeSession`]. Each sample is smoothed and screen-calibrated, tagged
//! with its instantaneous velocity, and fed through a hysteresis state
//! machine that segments the stream into typed movement events (fixations,
//! saccades, post-saccadic oscillations, glissades). Aggregated reading
//! metrics and a weighted dyslexia-risk score are available on demand.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gaze_analyzer::app::config::Config;
//! use gaze_analyzer::session::GazeSession;
//! use gaze_analyzer::tracking::types::GazeSample;
//!
//! let mut session = GazeSession::new(&Config::default());
//!
//! // ... push samples as they arrive from the gaze source ...
//! let kind = session
//!     .process_sample(GazeSample::new(512.0, 384.0, 16.7))
//!     .expect("not in calibration phase");
//! println!("live movement type: {kind}");
//!
//! // Flush the in-flight event and query results.
//! session.finish();
//! let metrics = session.metrics();
//! let score = session.score(600);
//! println!("{} fixations, risk: {}", metrics.fixation_count, score.risk_level);
//! ```
//!
//! ## Architecture
//!
//! - [`tracking`]: sample/event types and bounded FIFO buffers
//! - [`filtering`]: temporal smoothing, adaptive gating, and screen calibration
//! - [`analysis`]: movement classification, reading metrics, risk scoring
//! - [`session`]: per-session pipeline orchestration and recordings
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │ GazeSample │───▶│ Smoothing  │───▶│  Movement  │───▶│   Event    │
//! │  (raw)     │    │ + Calibr.  │    │ Classifier │    │  History   │
//! └────────────┘    └────────────┘    └────────────┘    └────────────┘
//!                                                             │
//!                                          ┌──────────────────┴───┐
//!                                          ▼                      ▼
//!                                   ┌────────────┐        ┌────────────┐
//!                                   │  Reading   │        │  Dyslexia  │
//!                                   │  Metrics   │        │   Score    │
//!                                   └────────────┘        └────────────┘
//! ```
//!
//! The core is synchronous and single-threaded: one call per incoming sample,
//! no internal buffering beyond the bounded windows, no background threads.

pub mod tracking;
pub mod filtering;
pub mod analysis;
pub mod session;
pub mod app;

// Re-export commonly used types
pub use analysis::event_classifier::EventClassifier;
pub use analysis::metrics::ReadingMetrics;
pub use analysis::scoring::{DyslexiaScore, RiskLevel};
pub use filtering::calibration::CalibrationModel;
pub use filtering::smoothing::SmoothingFilter;
pub use session::GazeSession;
pub use tracking::types::{FilteredFrame, GazeSample, MovementEvent, MovementKind};

/// Result type alias for the gaze analyzer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gaze analyzer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Calibration error: {0}")]
    Calibration(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
