//! Core types for gaze tracking
//!
//! Defines the fundamental data structures flowing through the pipeline:
//! raw samples in, filtered frames through the smoothing stage, and typed
//! movement events out of the classifier.

use serde::{Deserialize, Serialize};

/// A single raw gaze observation in screen-pixel space.
///
/// Produced by the external gaze source (webcam estimator or hardware
/// tracker) at its native frame rate, commonly 15-60 Hz. Immutable once
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Horizontal position (pixels)
    pub x: f64,
    /// Vertical position (pixels)
    pub y: f64,
    /// Timestamp in milliseconds, monotonically non-decreasing per session
    pub timestamp_ms: f64,
}

impl GazeSample {
    pub fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Euclidean distance to another sample (pixels)
    pub fn distance_to(&self, other: &GazeSample) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Output of the smoothing stage: a stabilized, screen-calibrated gaze
/// position tagged with its instantaneous velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilteredFrame {
    /// Calibrated horizontal position (pixels)
    pub x: f64,
    /// Calibrated vertical position (pixels)
    pub y: f64,
    /// Timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Instantaneous velocity in degrees of visual angle per second
    pub velocity: f64,
}

/// Movement event types emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Gaze essentially stationary on one point
    Fixation,
    /// Fast ballistic movement between fixations
    Saccade,
    /// Post-saccadic oscillation: brief high-frequency wobble after landing
    Pso,
    /// Slower post-saccadic drift before settling into fixation
    Glissade,
    /// Eyelid closure reported by the gaze source
    Blink,
    /// Tracking loss or movement matching no other criterion
    Unknown,
}

impl MovementKind {
    pub fn is_fixation(&self) -> bool {
        matches!(self, MovementKind::Fixation)
    }

    pub fn is_saccade(&self) -> bool {
        matches!(self, MovementKind::Saccade)
    }

    /// Check if this is a post-saccadic kind (PSO or glissade)
    pub fn is_post_saccadic(&self) -> bool {
        matches!(self, MovementKind::Pso | MovementKind::Glissade)
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MovementKind::Fixation => "fixation",
            MovementKind::Saccade => "saccade",
            MovementKind::Pso => "pso",
            MovementKind::Glissade => "glissade",
            MovementKind::Blink => "blink",
            MovementKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A finalized movement event.
///
/// Created only by the classifier when the detected movement type changes
/// (or on forced flush); immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementEvent {
    /// Event type
    pub kind: MovementKind,
    /// Timestamp of the first sample (ms)
    pub start_time_ms: f64,
    /// Timestamp of the last sample (ms)
    pub end_time_ms: f64,
    /// `end_time_ms - start_time_ms`
    pub duration_ms: f64,
    /// Position of the first sample
    pub start_x: f64,
    pub start_y: f64,
    /// Position of the last sample
    pub end_x: f64,
    pub end_y: f64,
    /// Maximum instantaneous velocity observed across the event (deg/s)
    pub peak_velocity: f64,
    /// Degrees of visual angle between the first and last sample
    pub amplitude: f64,
    /// True when the horizontal displacement is leftward beyond the
    /// regression tolerance (read-direction dependent)
    pub is_regression: bool,
}

impl MovementEvent {
    /// Horizontal displacement from start to end (pixels, signed)
    pub fn displacement_x(&self) -> f64 {
        self.end_x - self.start_x
    }

    /// Check whether this event counts as a regression saccade
    pub fn is_regression_saccade(&self) -> bool {
        self.kind.is_saccade() && self.is_regression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_distance() {
        let a = GazeSample::new(0.0, 0.0, 0.0);
        let b = GazeSample::new(3.0, 4.0, 10.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(MovementKind::Fixation.is_fixation());
        assert!(MovementKind::Saccade.is_saccade());
        assert!(MovementKind::Pso.is_post_saccadic());
        assert!(MovementKind::Glissade.is_post_saccadic());
        assert!(!MovementKind::Fixation.is_post_saccadic());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MovementKind::Pso.to_string(), "pso");
        assert_eq!(MovementKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_kind_serde_roundtrip() {
        let json = serde_json::to_string(&MovementKind::Glissade).unwrap();
        assert_eq!(json, "\"glissade\"");
        let back: MovementKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MovementKind::Glissade);
    }

    #[test]
    fn test_event_displacement() {
        let event = MovementEvent {
            kind: MovementKind::Saccade,
            start_time_ms: 0.0,
            end_time_ms: 20.0,
            duration_ms: 20.0,
            start_x: 300.0,
            start_y: 100.0,
            end_x: 250.0,
            end_y: 100.0,
            peak_velocity: 80.0,
            amplitude: 1.25,
            is_regression: true,
        };
        assert_eq!(event.displacement_x(), -50.0);
        assert!(event.is_regression_saccade());
    }
}
