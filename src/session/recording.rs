//! Session Recordings
//!
//! Serialization format for captured gaze sessions: raw samples plus the
//! finalized events the pipeline produced. Recordings can be saved to JSON
//! and replayed through a fresh pipeline for offline re-analysis with
//! different configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::app::config::Config;
use crate::session::GazeSession;
use crate::tracking::types::{GazeSample, MovementEvent};
use crate::{Error, Result};

/// Current recording format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Recording metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    /// Unique recording ID
    pub id: Uuid,
    /// Recording name
    pub name: String,
    /// Character count of the text being read, if known
    pub text_length: Option<usize>,
    /// Recording start time (wall clock)
    pub started_at: DateTime<Utc>,
    /// Recording end time
    pub ended_at: Option<DateTime<Utc>>,
    /// Total sample count
    pub sample_count: usize,
    /// Total finalized event count
    pub event_count: usize,
    /// Covered session time in milliseconds
    pub duration_ms: f64,
    /// Version of the recording format
    pub format_version: String,
}

impl RecordingMetadata {
    pub fn new(name: String, text_length: Option<usize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            text_length,
            started_at: Utc::now(),
            ended_at: None,
            sample_count: 0,
            event_count: 0,
            duration_ms: 0.0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }

    /// Finalize the recording with end time and totals
    pub fn finalize(&mut self, sample_count: usize, event_count: usize, duration_ms: f64) {
        self.ended_at = Some(Utc::now());
        self.sample_count = sample_count;
        self.event_count = event_count;
        self.duration_ms = duration_ms;
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            text_length: None,
            started_at: Utc::now(),
            ended_at: None,
            sample_count: 0,
            event_count: 0,
            duration_ms: 0.0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

/// A complete recorded session: raw samples in arrival order plus the
/// events the live pipeline finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecording {
    pub metadata: RecordingMetadata,
    pub samples: Vec<GazeSample>,
    pub events: Vec<MovementEvent>,
}

impl SessionRecording {
    pub fn new(name: String, text_length: Option<usize>) -> Self {
        Self {
            metadata: RecordingMetadata::new(name, text_length),
            samples: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn add_sample(&mut self, sample: GazeSample) {
        self.samples.push(sample);
    }

    /// Close the recording, capturing the session's event history.
    pub fn finalize(&mut self, events: Vec<MovementEvent>) {
        let duration_ms = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        };
        self.events = events;
        self.metadata
            .finalize(self.samples.len(), self.events.len(), duration_ms);
    }

    /// Re-run the recorded samples through a fresh pipeline and return the
    /// session, e.g. to re-classify with different thresholds.
    pub fn replay(&self, config: &Config) -> Result<GazeSession> {
        let mut session = GazeSession::new(config);
        for sample in &self.samples {
            session.process_sample(*sample)?;
        }
        session.finish();
        info!(
            samples = self.samples.len(),
            events = session.events().len(),
            "recording replayed"
        );
        Ok(session)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "recording saved");
        Ok(())
    }

    /// Load from a JSON file, rejecting unknown format versions.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let recording: Self = serde_json::from_str(&content)?;
        if recording.metadata.format_version != CURRENT_FORMAT_VERSION {
            return Err(Error::Recording(format!(
                "unsupported recording format version: {}",
                recording.metadata.format_version
            )));
        }
        Ok(recording)
    }
}
