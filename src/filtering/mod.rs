//! Calibration & smoothing stage
//!
//! Converts the raw sample stream into a stabilized, screen-mapped stream
//! while preserving sharp transitions during rapid eye movements.

pub mod calibration;
pub mod smoothing;

pub use calibration::CalibrationModel;
pub use smoothing::{FilterConfig, SmoothingFilter};
