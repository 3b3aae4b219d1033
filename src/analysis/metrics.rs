//! Reading Metrics Aggregation
//!
//! Pure reduction over the finalized event history. Metrics are recomputed
//! from the current event list on every query rather than incrementally
//! cached, so they can never drift from the history they summarize.

use serde::{Deserialize, Serialize};

use crate::tracking::types::{MovementEvent, MovementKind};

/// Summary statistics over a classified event stream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadingMetrics {
    pub saccade_count: usize,
    /// Saccades flagged as regressions
    pub regression_count: usize,
    /// Regressions as a percentage of saccades (0 when there are none)
    pub regression_rate: f64,
    pub pso_count: usize,
    pub glissade_count: usize,
    pub fixation_count: usize,
    /// Mean fixation duration in milliseconds (0 when there are none)
    pub average_fixation_duration_ms: f64,
    /// Mean saccade amplitude in degrees (0 when there are none)
    pub average_saccade_amplitude: f64,
    /// Span from the first event start to the last event end (ms)
    pub total_reading_time_ms: f64,
}

impl ReadingMetrics {
    /// Reduce an event list into summary statistics.
    pub fn from_events(events: &[MovementEvent]) -> Self {
        let mut metrics = ReadingMetrics::default();
        if events.is_empty() {
            return metrics;
        }

        let mut fixation_duration_sum = 0.0;
        let mut saccade_amplitude_sum = 0.0;

        for event in events {
            match event.kind {
                MovementKind::Fixation => {
                    metrics.fixation_count += 1;
                    fixation_duration_sum += event.duration_ms;
                }
                MovementKind::Saccade => {
                    metrics.saccade_count += 1;
                    saccade_amplitude_sum += event.amplitude;
                    if event.is_regression {
                        metrics.regression_count += 1;
                    }
                }
                MovementKind::Pso => metrics.pso_count += 1,
                MovementKind::Glissade => metrics.glissade_count += 1,
                MovementKind::Blink | MovementKind::Unknown => {}
            }
        }

        if metrics.saccade_count > 0 {
            metrics.regression_rate =
                metrics.regression_count as f64 / metrics.saccade_count as f64 * 100.0;
            metrics.average_saccade_amplitude =
                saccade_amplitude_sum / metrics.saccade_count as f64;
        }
        if metrics.fixation_count > 0 {
            metrics.average_fixation_duration_ms =
                fixation_duration_sum / metrics.fixation_count as f64;
        }

        let first_start = events
            .iter()
            .map(|e| e.start_time_ms)
            .fold(f64::INFINITY, f64::min);
        let last_end = events
            .iter()
            .map(|e| e.end_time_ms)
            .fold(f64::NEG_INFINITY, f64::max);
        metrics.total_reading_time_ms = last_end - first_start;

        metrics
    }
}
