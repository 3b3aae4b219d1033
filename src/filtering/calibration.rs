//! Regression-Based Screen Calibration
//!
//! Maps filtered gaze positions onto screen coordinates with a per-axis
//! linear model fit by ridge regression over collected (gaze, target) pairs.
//! Features are `[x / viewport_w, y / viewport_h, 1]`; each axis solves
//! `(XᵗX + λI)·w = Xᵗy` via Gaussian elimination with partial pivoting.
//!
//! An untrained model is the identity transform. Training either succeeds
//! and commits both axes, or fails and leaves the model untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::tracking::types::GazeSample;
use crate::{Error, Result};

/// Feature dimension: normalized-x, normalized-y, bias
pub const FEATURE_DIM: usize = 3;

/// Minimum number of (gaze, target) pairs required to train
pub const MIN_CALIBRATION_POINTS: usize = 5;

/// Pivots below this magnitude mark the system as near-singular
const SINGULARITY_EPSILON: f64 = 1e-12;

/// One collected training pair: normalized gaze features and the screen
/// point the user was looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPair {
    pub features: [f64; FEATURE_DIM],
    pub target_x: f64,
    pub target_y: f64,
}

/// Per-axis linear screen-mapping model.
///
/// Mutated only during an explicit calibration phase; read-only during live
/// tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationModel {
    weights_x: [f64; FEATURE_DIM],
    weights_y: [f64; FEATURE_DIM],
    lambda: f64,
    is_calibrated: bool,
    points: Vec<CalibrationPair>,
    viewport_width: f64,
    viewport_height: f64,
}

impl CalibrationModel {
    /// Create an untrained (identity) model for the given viewport.
    pub fn new(viewport_width: f64, viewport_height: f64, lambda: f64) -> Self {
        Self {
            weights_x: [0.0; FEATURE_DIM],
            weights_y: [0.0; FEATURE_DIM],
            lambda,
            is_calibrated: false,
            points: Vec::new(),
            viewport_width,
            viewport_height,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Normalize a raw gaze position into the model's feature vector.
    fn features(&self, x: f64, y: f64) -> [f64; FEATURE_DIM] {
        [x / self.viewport_width, y / self.viewport_height, 1.0]
    }

    /// Collect one training pair: where the filter says the user is looking
    /// versus the known on-screen target.
    pub fn add_point(&mut self, gaze: GazeSample, target_x: f64, target_y: f64) {
        let pair = CalibrationPair {
            features: self.features(gaze.x, gaze.y),
            target_x,
            target_y,
        };
        self.points.push(pair);
        debug!(
            points = self.points.len(),
            target_x, target_y, "collected calibration point"
        );
    }

    /// Discard collected points without touching trained weights.
    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Drop both the trained weights and the collected points, returning the
    /// model to the identity transform.
    pub fn reset(&mut self) {
        self.weights_x = [0.0; FEATURE_DIM];
        self.weights_y = [0.0; FEATURE_DIM];
        self.is_calibrated = false;
        self.points.clear();
    }

    /// Fit both axes from the collected points.
    ///
    /// Requires at least [`MIN_CALIBRATION_POINTS`] pairs. On a
    /// near-singular system the model keeps its previous weights and an
    /// error is returned; the caller may collect more points and retry.
    /// Training is idempotent for a fixed point set.
    pub fn train(&mut self) -> Result<()> {
        if self.points.len() < MIN_CALIBRATION_POINTS {
            return Err(Error::Calibration(format!(
                "need at least {} calibration points, have {}",
                MIN_CALIBRATION_POINTS,
                self.points.len()
            )));
        }

        // Normal equations, shared between axes: XᵗX + λI and per-axis Xᵗy.
        let mut xtx = [[0.0f64; FEATURE_DIM]; FEATURE_DIM];
        let mut xty_x = [0.0f64; FEATURE_DIM];
        let mut xty_y = [0.0f64; FEATURE_DIM];
        for pair in &self.points {
            for i in 0..FEATURE_DIM {
                for j in 0..FEATURE_DIM {
                    xtx[i][j] += pair.features[i] * pair.features[j];
                }
                xty_x[i] += pair.features[i] * pair.target_x;
                xty_y[i] += pair.features[i] * pair.target_y;
            }
        }
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += self.lambda;
        }

        // Solve both axes before committing either, so a failure on the
        // second axis cannot leave the model half-updated.
        let weights_x = solve_linear_system(xtx, xty_x).ok_or_else(|| {
            warn!("calibration system near-singular on x axis");
            Error::Calibration("near-singular calibration system".to_string())
        })?;
        let weights_y = solve_linear_system(xtx, xty_y).ok_or_else(|| {
            warn!("calibration system near-singular on y axis");
            Error::Calibration("near-singular calibration system".to_string())
        })?;

        self.weights_x = weights_x;
        self.weights_y = weights_y;
        self.is_calibrated = true;
        info!(points = self.points.len(), "calibration model trained");
        Ok(())
    }

    /// Map a filtered gaze position onto screen coordinates.
    ///
    /// Identity transform while untrained; trained output is clamped to the
    /// viewport bounds.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        if !self.is_calibrated {
            return (x, y);
        }
        let features = self.features(x, y);
        let mut sx = 0.0;
        let mut sy = 0.0;
        for i in 0..FEATURE_DIM {
            sx += self.weights_x[i] * features[i];
            sy += self.weights_y[i] * features[i];
        }
        (
            sx.clamp(0.0, self.viewport_width),
            sy.clamp(0.0, self.viewport_height),
        )
    }

    /// Trained x-axis weights (for diagnostics and tests)
    pub fn weights_x(&self) -> [f64; FEATURE_DIM] {
        self.weights_x
    }

    /// Trained y-axis weights (for diagnostics and tests)
    pub fn weights_y(&self) -> [f64; FEATURE_DIM] {
        self.weights_y
    }
}

/// Solve `a·w = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when the best available pivot falls below the singularity
/// epsilon, leaving degeneracy handling to the caller.
fn solve_linear_system(
    mut a: [[f64; FEATURE_DIM]; FEATURE_DIM],
    mut b: [f64; FEATURE_DIM],
) -> Option<[f64; FEATURE_DIM]> {
    for col in 0..FEATURE_DIM {
        // Partial pivoting: bring the largest remaining entry to the diagonal
        let mut pivot_row = col;
        for row in (col + 1)..FEATURE_DIM {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if a[pivot_row][col].abs() < SINGULARITY_EPSILON {
            return None;
        }
        if pivot_row != col {
            a.swap(col, pivot_row);
            b.swap(col, pivot_row);
        }

        for row in (col + 1)..FEATURE_DIM {
            let factor = a[row][col] / a[col][col];
            for k in col..FEATURE_DIM {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut w = [0.0f64; FEATURE_DIM];
    for col in (0..FEATURE_DIM).rev() {
        let mut sum = b[col];
        for k in (col + 1)..FEATURE_DIM {
            sum -= a[col][k] * w[k];
        }
        w[col] = sum / a[col][col];
    }
    Some(w)
}
