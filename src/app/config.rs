//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::event_classifier::ClassifierConfig;
use crate::analysis::scoring::ScoringConfig;
use crate::filtering::smoothing::FilterConfig;

/// Main configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Smoothing and calibration settings
    pub filter: FilterConfig,
    /// Movement classifier settings
    pub classifier: ClassifierConfig,
    /// Risk scoring settings
    pub scoring: ScoringConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.filter.window_size == 0 || self.filter.window_size > 100 {
            return Err(crate::Error::Config(format!(
                "window_size must be in [1, 100], got {}",
                self.filter.window_size
            )));
        }
        if self.filter.pixels_per_degree <= 0.0 {
            return Err(crate::Error::Config(format!(
                "pixels_per_degree must be > 0, got {}",
                self.filter.pixels_per_degree
            )));
        }
        if !(0.0..=1.0).contains(&self.filter.gate_decay) {
            return Err(crate::Error::Config(format!(
                "gate_decay must be in [0, 1], got {}",
                self.filter.gate_decay
            )));
        }
        if self.filter.viewport_width <= 0.0 || self.filter.viewport_height <= 0.0 {
            return Err(crate::Error::Config("viewport dimensions must be > 0".to_string()));
        }
        if self.filter.calibration_lambda < 0.0 {
            return Err(crate::Error::Config(format!(
                "calibration_lambda must be >= 0, got {}",
                self.filter.calibration_lambda
            )));
        }
        if self.classifier.saccade_velocity_threshold <= 0.0 {
            return Err(crate::Error::Config(
                "saccade_velocity_threshold must be > 0".to_string(),
            ));
        }
        if self.classifier.pso_velocity_threshold <= 0.0
            || self.classifier.pso_velocity_threshold >= self.classifier.saccade_velocity_threshold
        {
            return Err(crate::Error::Config(format!(
                "pso_velocity_threshold must be in (0, saccade threshold), got {}",
                self.classifier.pso_velocity_threshold
            )));
        }
        if self.classifier.post_saccade_window_ms <= 0.0
            || self.classifier.glissade_window_ms <= self.classifier.post_saccade_window_ms
        {
            return Err(crate::Error::Config(
                "glissade_window_ms must be greater than post_saccade_window_ms".to_string(),
            ));
        }
        if self.classifier.min_event_duration_ms < 0.0 {
            return Err(crate::Error::Config(
                "min_event_duration_ms must be >= 0".to_string(),
            ));
        }
        if self.classifier.sample_buffer_size == 0 || self.classifier.sample_buffer_size > 100 {
            return Err(crate::Error::Config(format!(
                "sample_buffer_size must be in [1, 100], got {}",
                self.classifier.sample_buffer_size
            )));
        }
        if self.classifier.event_history_size == 0 || self.classifier.event_history_size > 500 {
            return Err(crate::Error::Config(format!(
                "event_history_size must be in [1, 500], got {}",
                self.classifier.event_history_size
            )));
        }

        let weight_sum = self.scoring.weight_fixation_duration
            + self.scoring.weight_regression_rate
            + self.scoring.weight_prolonged_fixations
            + self.scoring.weight_chaos_index
            + self.scoring.weight_fic;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(crate::Error::Config(format!(
                "scoring weights must sum to 1.0, got {}",
                weight_sum
            )));
        }
        if self.scoring.moderate_risk_probability >= self.scoring.high_risk_probability {
            return Err(crate::Error::Config(
                "moderate_risk_probability must be below high_risk_probability".to_string(),
            ));
        }
        if self.scoring.fic_grid_cell_px <= 0.0 {
            return Err(crate::Error::Config(
                "fic_grid_cell_px must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gaze_analyzer").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
