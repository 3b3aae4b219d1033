//! Temporal Smoothing & Adaptive Gating
//!
//! Per-sample smoothing stage that stabilizes fixation jitter without
//! blurring saccades. During apparent fixation a recency-weighted window
//! average feeds a gated-recurrent blend against the previous output; once
//! velocity crosses the saccade threshold the raw position passes through
//! untouched, so saccadic sharpness is never smeared by the filter.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::filtering::calibration::CalibrationModel;
use crate::tracking::sample_buffer::BoundedBuffer;
use crate::tracking::types::{FilteredFrame, GazeSample};

/// Default smoothing window size (samples)
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Default saccade velocity threshold (degrees of visual angle per second)
pub const DEFAULT_SACCADE_VELOCITY: f64 = 30.0;

/// Default screen resolution constant for pixel-to-degree conversion
pub const DEFAULT_PIXELS_PER_DEGREE: f64 = 40.0;

/// Smoothing stage configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Sliding window size for spatial smoothing
    pub window_size: usize,
    /// Velocity above which a sample is treated as saccadic (deg/s)
    pub saccade_velocity_threshold: f64,
    /// Pixels per degree of visual angle
    pub pixels_per_degree: f64,
    /// Decay constant of the adaptive gate
    pub gate_decay: f64,
    /// Viewport width in pixels (calibration target space)
    pub viewport_width: f64,
    /// Viewport height in pixels
    pub viewport_height: f64,
    /// Ridge regularization for the calibration model
    pub calibration_lambda: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            saccade_velocity_threshold: DEFAULT_SACCADE_VELOCITY,
            pixels_per_degree: DEFAULT_PIXELS_PER_DEGREE,
            gate_decay: 0.15,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
            calibration_lambda: 1e-3,
        }
    }
}

/// The calibration & smoothing stage.
///
/// Holds the sliding sample window, the previous raw sample for velocity
/// estimation, the gated hidden position, and the trained calibration model.
pub struct SmoothingFilter {
    config: FilterConfig,
    window: BoundedBuffer<GazeSample>,
    prev_raw: Option<GazeSample>,
    hidden: Option<(f64, f64)>,
    calibration: CalibrationModel,
}

impl SmoothingFilter {
    pub fn new(config: FilterConfig) -> Self {
        let calibration = CalibrationModel::new(
            config.viewport_width,
            config.viewport_height,
            config.calibration_lambda,
        );
        Self {
            window: BoundedBuffer::new(config.window_size),
            prev_raw: None,
            hidden: None,
            calibration,
            config,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    pub fn calibration_mut(&mut self) -> &mut CalibrationModel {
        &mut self.calibration
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Run one raw sample through the stage.
    pub fn process(&mut self, sample: GazeSample) -> FilteredFrame {
        let velocity = self.instantaneous_velocity(&sample);
        self.prev_raw = Some(sample);
        self.window.push(sample);

        let (gx, gy) = if velocity > self.config.saccade_velocity_threshold {
            // Saccadic sample: bypass gating entirely and re-anchor the
            // hidden position at the landing point.
            self.hidden = Some((sample.x, sample.y));
            (sample.x, sample.y)
        } else {
            let (sx, sy) = self.recency_weighted_average();
            let (hx, hy) = self.hidden.unwrap_or((sx, sy));

            let reset = sigmoid(2.0 * (velocity / self.config.saccade_velocity_threshold).min(3.0) - 1.0);
            let update = 1.0 - reset * self.config.gate_decay;
            let gated = (
                update * hx + (1.0 - update) * sx,
                update * hy + (1.0 - update) * sy,
            );
            self.hidden = Some(gated);
            gated
        };

        let (cx, cy) = self.calibration.apply(gx, gy);
        trace!(velocity, gx, gy, cx, cy, "filtered sample");

        FilteredFrame {
            x: cx,
            y: cy,
            timestamp_ms: sample.timestamp_ms,
            velocity,
        }
    }

    /// Clear the window, the previous sample, and the gated hidden position.
    /// The calibration model is not touched; it survives session resets.
    pub fn reset(&mut self) {
        self.window.clear();
        self.prev_raw = None;
        self.hidden = None;
    }

    /// Velocity from the previous raw sample in deg/s; zero when there is no
    /// previous sample or the timestamps do not advance.
    fn instantaneous_velocity(&self, sample: &GazeSample) -> f64 {
        let prev = match &self.prev_raw {
            Some(prev) => prev,
            None => return 0.0,
        };
        let dt_s = (sample.timestamp_ms - prev.timestamp_ms) / 1000.0;
        if dt_s <= 0.0 {
            trace!(
                timestamp_ms = sample.timestamp_ms,
                "non-advancing timestamp, velocity forced to zero"
            );
            return 0.0;
        }
        let degrees = prev.distance_to(sample) / self.config.pixels_per_degree;
        degrees / dt_s
    }

    /// Window average with linearly increasing weight toward the most recent
    /// sample.
    fn recency_weighted_average(&self) -> (f64, f64) {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut total = 0.0;
        for (i, s) in self.window.iter().enumerate() {
            let weight = (i + 1) as f64;
            sum_x += s.x * weight;
            sum_y += s.y * weight;
            total += weight;
        }
        if total == 0.0 {
            return (0.0, 0.0);
        }
        (sum_x / total, sum_y / total)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
