//! Session Orchestration
//!
//! A [`GazeSession`] owns one smoothing stage and one classifier and drives
//! them once per incoming sample. Sessions are single-threaded and
//! single-writer: calibration-point collection is an exclusive phase, and no
//! live classification runs against the same session while it is active.

pub mod recording;

use tracing::{debug, info};

use crate::analysis::event_classifier::EventClassifier;
use crate::analysis::metrics::ReadingMetrics;
use crate::analysis::scoring::{DyslexiaScore, DyslexiaScorer};
use crate::app::config::Config;
use crate::filtering::smoothing::SmoothingFilter;
use crate::tracking::types::{GazeSample, MovementEvent, MovementKind};
use crate::{Error, Result};

pub use recording::{RecordingMetadata, SessionRecording};

/// One logical tracking session: filter, classifier, and scorer bound
/// together. Not shared across sessions; create a fresh one per user run.
pub struct GazeSession {
    filter: SmoothingFilter,
    classifier: EventClassifier,
    scorer: DyslexiaScorer,
    calibrating: bool,
    samples_processed: u64,
}

impl GazeSession {
    pub fn new(config: &Config) -> Self {
        Self {
            filter: SmoothingFilter::new(config.filter),
            classifier: EventClassifier::new(config.classifier),
            scorer: DyslexiaScorer::new(config.scoring),
            calibrating: false,
            samples_processed: 0,
        }
    }

    /// Run one raw sample through the pipeline and return the live movement
    /// type. Fails while a calibration phase is active.
    pub fn process_sample(&mut self, sample: GazeSample) -> Result<MovementKind> {
        if self.calibrating {
            return Err(Error::Session(
                "cannot classify while calibration collection is active".to_string(),
            ));
        }
        let frame = self.filter.process(sample);
        let kind = self.classifier.process(frame);
        self.samples_processed += 1;
        Ok(kind)
    }

    /// Begin the exclusive calibration-collection phase.
    pub fn begin_calibration(&mut self) {
        info!("calibration phase started");
        self.calibrating = true;
        self.filter.calibration_mut().clear_points();
    }

    /// Collect one (gaze, target) pair. Only valid during calibration.
    pub fn add_calibration_point(
        &mut self,
        gaze: GazeSample,
        target_x: f64,
        target_y: f64,
    ) -> Result<()> {
        if !self.calibrating {
            return Err(Error::Session(
                "calibration phase is not active".to_string(),
            ));
        }
        self.filter
            .calibration_mut()
            .add_point(gaze, target_x, target_y);
        Ok(())
    }

    /// End the calibration phase, training the model from the collected
    /// points. Training failure (too few points, degenerate system) leaves
    /// the previous model in place; the session returns to live tracking
    /// either way.
    pub fn end_calibration(&mut self) -> Result<()> {
        self.calibrating = false;
        let result = self.filter.calibration_mut().train();
        match &result {
            Ok(()) => info!("calibration phase ended, model trained"),
            Err(e) => debug!(error = %e, "calibration phase ended without a usable model"),
        }
        result
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn is_calibrated(&self) -> bool {
        self.filter.is_calibrated()
    }

    /// Live movement type of the in-flight event (for real-time overlays).
    pub fn current_kind(&self) -> MovementKind {
        self.classifier.current_kind()
    }

    /// Force-finalize the in-flight event (e.g. at session end).
    pub fn finish(&mut self) {
        self.classifier.finish();
    }

    /// Finalized event history, oldest first.
    pub fn events(&self) -> Vec<MovementEvent> {
        self.classifier.events()
    }

    /// Summary metrics recomputed from the current event history.
    pub fn metrics(&self) -> ReadingMetrics {
        ReadingMetrics::from_events(&self.classifier.events())
    }

    /// Risk score computed from the current event history.
    ///
    /// `text_length` is the character count of the text being read, used for
    /// the reading-speed estimate.
    pub fn score(&self, text_length: usize) -> DyslexiaScore {
        let events = self.classifier.events();
        let fixations: Vec<MovementEvent> = events
            .iter()
            .filter(|e| e.kind.is_fixation())
            .copied()
            .collect();
        let saccades: Vec<MovementEvent> = events
            .iter()
            .filter(|e| e.kind.is_saccade())
            .copied()
            .collect();
        let metrics = ReadingMetrics::from_events(&events);
        self.scorer
            .score(&fixations, &saccades, metrics.total_reading_time_ms, text_length)
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    /// Discard all runtime state: smoothing window, in-flight event,
    /// post-saccade tracking, and the event history. The trained calibration
    /// model survives, so a reset session stays screen-mapped.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.classifier.reset();
        self.classifier.clear_history();
        self.samples_processed = 0;
        self.calibrating = false;
        debug!("session reset");
    }
}
