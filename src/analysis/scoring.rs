//! Clinical Risk Scoring
//!
//! Combines fixation/saccade geometry into a single weighted dyslexia-risk
//! probability with explainable sub-indicators. Each indicator is normalized
//! to `[0, 1]` against a saturation point and combined via fixed weights;
//! clinical notes are generated deterministically from the flagged
//! indicators and the resulting tier. No model call is involved anywhere.
//!
//! The thresholds, saturation points, and weights are empirically chosen
//! constants, kept configurable rather than treated as settled science.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tracking::types::MovementEvent;

/// Scoring configuration: indicator thresholds, saturation points, and
/// combination weights. The five weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Flag threshold for mean fixation duration (ms)
    pub fixation_duration_threshold_ms: f64,
    /// A fixation longer than this counts as prolonged (ms)
    pub prolonged_fixation_ms: f64,
    /// Flag threshold for the prolonged-fixation percentage
    pub prolonged_ratio_threshold_pct: f64,
    /// Flag threshold for the regression percentage
    pub regression_rate_threshold_pct: f64,
    /// Reading speed below this is flagged (words per minute)
    pub reading_speed_threshold_wpm: f64,
    /// Reading speed below this gets a stronger flag (words per minute)
    pub reading_speed_severe_wpm: f64,
    /// Flag threshold for the chaos index
    pub chaos_index_threshold: f64,
    /// Flag threshold for the fixation intersection coefficient
    pub fic_threshold: f64,

    /// Saturation point of the fixation-duration indicator (ms)
    pub fixation_duration_saturation_ms: f64,
    /// Saturation point of the prolonged-ratio indicator (%)
    pub prolonged_ratio_saturation_pct: f64,
    /// Saturation point of the regression-rate indicator (%)
    pub regression_rate_saturation_pct: f64,
    /// Saturation point of the chaos-index indicator
    pub chaos_index_saturation: f64,
    /// Saturation point of the FIC indicator
    pub fic_saturation: f64,

    /// Combination weight of mean fixation duration
    pub weight_fixation_duration: f64,
    /// Combination weight of the regression rate
    pub weight_regression_rate: f64,
    /// Combination weight of the prolonged-fixation ratio
    pub weight_prolonged_fixations: f64,
    /// Combination weight of the chaos index
    pub weight_chaos_index: f64,
    /// Combination weight of the FIC
    pub weight_fic: f64,

    /// Spatial grid cell size for the FIC re-reading measure (px)
    pub fic_grid_cell_px: f64,
    /// Fixations shorter than this are excluded from the geometry-based
    /// indicators (chaos index, FIC) as tracking flicker (ms)
    pub min_fixation_duration_ms: f64,
    /// Leftward tolerance when counting regressive saccades (px)
    pub regression_tolerance_px: f64,

    /// Probability at or above which the risk tier is High
    pub high_risk_probability: f64,
    /// Probability at or above which the risk tier is Moderate
    pub moderate_risk_probability: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fixation_duration_threshold_ms: 250.0,
            prolonged_fixation_ms: 400.0,
            prolonged_ratio_threshold_pct: 15.0,
            regression_rate_threshold_pct: 20.0,
            reading_speed_threshold_wpm: 80.0,
            reading_speed_severe_wpm: 50.0,
            chaos_index_threshold: 0.35,
            fic_threshold: 0.6,
            fixation_duration_saturation_ms: 400.0,
            prolonged_ratio_saturation_pct: 30.0,
            regression_rate_saturation_pct: 40.0,
            chaos_index_saturation: 0.5,
            fic_saturation: 0.8,
            weight_fixation_duration: 0.25,
            weight_regression_rate: 0.25,
            weight_prolonged_fixations: 0.20,
            weight_chaos_index: 0.15,
            weight_fic: 0.15,
            fic_grid_cell_px: 50.0,
            min_fixation_duration_ms: 100.0,
            regression_tolerance_px: 20.0,
            high_risk_probability: 0.65,
            moderate_risk_probability: 0.35,
        }
    }
}

/// Risk tier derived from the combined probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// One named metric with its flag threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub value: f64,
    pub threshold: f64,
    /// True when the value is on the risk side of the threshold
    pub exceeded: bool,
}

impl Indicator {
    fn above(value: f64, threshold: f64) -> Self {
        Self {
            value,
            threshold,
            exceeded: value > threshold,
        }
    }

    fn below(value: f64, threshold: f64) -> Self {
        Self {
            value,
            threshold,
            exceeded: value < threshold,
        }
    }
}

/// The fixed indicator set backing a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreIndicators {
    pub avg_fixation_duration: Indicator,
    pub prolonged_fixation_ratio: Indicator,
    pub regression_rate: Indicator,
    pub reading_speed: Indicator,
    pub chaos_index: Indicator,
    pub fixation_intersection: Indicator,
}

/// Raw indicator values, before thresholding and weighting.
///
/// Exposed so hosts (and tests) can score pre-computed values directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub avg_fixation_duration_ms: f64,
    pub prolonged_fixation_ratio_pct: f64,
    pub regression_rate_pct: f64,
    pub reading_speed_wpm: f64,
    pub chaos_index: f64,
    pub fixation_intersection: f64,
}

/// A computed risk score. Never mutated; a new score is a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyslexiaScore {
    /// Weighted probability in `[0, 1]`
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub indicators: ScoreIndicators,
    /// Deterministic human-readable notes for the flagged indicators
    pub clinical_notes: Vec<String>,
}

/// The clinical scoring engine.
pub struct DyslexiaScorer {
    config: ScoringConfig,
}

impl DyslexiaScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a session from its classified fixations and saccades.
    ///
    /// `total_reading_time_ms` and `text_length` (characters) feed the
    /// reading-speed estimate; words are approximated as `text_length / 5`.
    pub fn score(
        &self,
        fixations: &[MovementEvent],
        saccades: &[MovementEvent],
        total_reading_time_ms: f64,
        text_length: usize,
    ) -> DyslexiaScore {
        let values = self.derive_values(fixations, saccades, total_reading_time_ms, text_length);
        self.score_values(&values)
    }

    /// Derive the raw indicator values from event geometry.
    pub fn derive_values(
        &self,
        fixations: &[MovementEvent],
        saccades: &[MovementEvent],
        total_reading_time_ms: f64,
        text_length: usize,
    ) -> IndicatorValues {
        let cfg = &self.config;

        let avg_fixation_duration_ms = if fixations.is_empty() {
            0.0
        } else {
            fixations.iter().map(|f| f.duration_ms).sum::<f64>() / fixations.len() as f64
        };

        let prolonged_fixation_ratio_pct = if fixations.is_empty() {
            0.0
        } else {
            let prolonged = fixations
                .iter()
                .filter(|f| f.duration_ms > cfg.prolonged_fixation_ms)
                .count();
            prolonged as f64 / fixations.len() as f64 * 100.0
        };

        let regression_rate_pct = if saccades.is_empty() {
            0.0
        } else {
            let regressions = saccades
                .iter()
                .filter(|s| s.end_x < s.start_x - cfg.regression_tolerance_px)
                .count();
            regressions as f64 / saccades.len() as f64 * 100.0
        };

        let minutes = total_reading_time_ms / 60_000.0;
        let reading_speed_wpm = if minutes > 0.0 {
            (text_length as f64 / 5.0) / minutes
        } else {
            0.0
        };

        // Geometry indicators run on stable fixations only
        let stable: Vec<&MovementEvent> = fixations
            .iter()
            .filter(|f| f.duration_ms >= cfg.min_fixation_duration_ms)
            .collect();

        IndicatorValues {
            avg_fixation_duration_ms,
            prolonged_fixation_ratio_pct,
            regression_rate_pct,
            reading_speed_wpm,
            chaos_index: chaos_index(&stable),
            fixation_intersection: intersection_coefficient(&stable, cfg.fic_grid_cell_px),
        }
    }

    /// Pure scoring over pre-computed indicator values.
    pub fn score_values(&self, values: &IndicatorValues) -> DyslexiaScore {
        let cfg = &self.config;

        let indicators = ScoreIndicators {
            avg_fixation_duration: Indicator::above(
                values.avg_fixation_duration_ms,
                cfg.fixation_duration_threshold_ms,
            ),
            prolonged_fixation_ratio: Indicator::above(
                values.prolonged_fixation_ratio_pct,
                cfg.prolonged_ratio_threshold_pct,
            ),
            regression_rate: Indicator::above(
                values.regression_rate_pct,
                cfg.regression_rate_threshold_pct,
            ),
            reading_speed: Indicator::below(
                values.reading_speed_wpm,
                cfg.reading_speed_threshold_wpm,
            ),
            chaos_index: Indicator::above(values.chaos_index, cfg.chaos_index_threshold),
            fixation_intersection: Indicator::above(
                values.fixation_intersection,
                cfg.fic_threshold,
            ),
        };

        let probability = cfg.weight_fixation_duration
            * saturate(values.avg_fixation_duration_ms, cfg.fixation_duration_saturation_ms)
            + cfg.weight_regression_rate
                * saturate(values.regression_rate_pct, cfg.regression_rate_saturation_pct)
            + cfg.weight_prolonged_fixations
                * saturate(values.prolonged_fixation_ratio_pct, cfg.prolonged_ratio_saturation_pct)
            + cfg.weight_chaos_index * saturate(values.chaos_index, cfg.chaos_index_saturation)
            + cfg.weight_fic * saturate(values.fixation_intersection, cfg.fic_saturation);

        let risk_level = if probability >= cfg.high_risk_probability {
            RiskLevel::High
        } else if probability >= cfg.moderate_risk_probability {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        };

        DyslexiaScore {
            probability,
            risk_level,
            indicators,
            clinical_notes: self.notes(&indicators, risk_level, probability),
        }
    }

    /// Deterministic note generation from the flagged indicators.
    fn notes(
        &self,
        indicators: &ScoreIndicators,
        risk_level: RiskLevel,
        probability: f64,
    ) -> Vec<String> {
        let cfg = &self.config;
        let mut notes = Vec::new();

        if indicators.avg_fixation_duration.exceeded {
            notes.push(format!(
                "Average fixation duration of {:.0} ms exceeds the {:.0} ms threshold, suggesting slowed word decoding.",
                indicators.avg_fixation_duration.value, indicators.avg_fixation_duration.threshold
            ));
        }
        if indicators.prolonged_fixation_ratio.exceeded {
            notes.push(format!(
                "{:.1}% of fixations last longer than {:.0} ms (threshold {:.1}%).",
                indicators.prolonged_fixation_ratio.value,
                cfg.prolonged_fixation_ms,
                indicators.prolonged_fixation_ratio.threshold
            ));
        }
        if indicators.regression_rate.exceeded {
            notes.push(format!(
                "Regression rate of {:.1}% exceeds the {:.1}% threshold, indicating frequent re-reading.",
                indicators.regression_rate.value, indicators.regression_rate.threshold
            ));
        }
        if indicators.reading_speed.exceeded {
            if indicators.reading_speed.value < cfg.reading_speed_severe_wpm {
                notes.push(format!(
                    "Reading speed of {:.0} WPM is markedly below the expected range (under {:.0} WPM).",
                    indicators.reading_speed.value, cfg.reading_speed_severe_wpm
                ));
            } else {
                notes.push(format!(
                    "Reading speed of {:.0} WPM is below the {:.0} WPM threshold.",
                    indicators.reading_speed.value, indicators.reading_speed.threshold
                ));
            }
        }
        if indicators.chaos_index.exceeded {
            notes.push(format!(
                "Chaos index of {:.2} exceeds {:.2}: the scanning path is erratic rather than linear.",
                indicators.chaos_index.value, indicators.chaos_index.threshold
            ));
        }
        if indicators.fixation_intersection.exceeded {
            notes.push(format!(
                "Fixation intersection coefficient of {:.2} exceeds {:.2}: gaze frequently revisits previously read regions.",
                indicators.fixation_intersection.value, indicators.fixation_intersection.threshold
            ));
        }

        notes.push(format!(
            "Overall risk level: {} (probability {:.2}).",
            risk_level, probability
        ));
        notes
    }
}

/// Normalize a value against its saturation point into `[0, 1]`.
fn saturate(value: f64, saturation: f64) -> f64 {
    if saturation <= 0.0 {
        return 0.0;
    }
    (value / saturation).clamp(0.0, 1.0)
}

/// Mean normalized turning-angle difference between consecutive
/// fixation-to-fixation vectors: 0 for perfectly linear scanning, 1 for a
/// maximally erratic path. Needs at least three fixations.
fn chaos_index(fixations: &[&MovementEvent]) -> f64 {
    if fixations.len() < 3 {
        return 0.0;
    }

    let centers: Vec<(f64, f64)> = fixations
        .iter()
        .map(|f| ((f.start_x + f.end_x) / 2.0, (f.start_y + f.end_y) / 2.0))
        .collect();

    let mut sum = 0.0;
    let mut count = 0usize;
    for w in centers.windows(3) {
        let v1 = (w[1].0 - w[0].0, w[1].1 - w[0].1);
        let v2 = (w[2].0 - w[1].0, w[2].1 - w[1].1);
        // Degenerate (zero-length) hops contribute nothing
        if (v1.0 == 0.0 && v1.1 == 0.0) || (v2.0 == 0.0 && v2.1 == 0.0) {
            continue;
        }
        let a1 = v1.1.atan2(v1.0);
        let a2 = v2.1.atan2(v2.0);
        let mut diff = (a2 - a1).abs();
        if diff > std::f64::consts::PI {
            diff = 2.0 * std::f64::consts::PI - diff;
        }
        sum += diff / std::f64::consts::PI;
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Fraction of fixations landing in a spatial grid cell already visited
/// earlier in the session (re-reading measure).
fn intersection_coefficient(fixations: &[&MovementEvent], cell_px: f64) -> f64 {
    if fixations.is_empty() || cell_px <= 0.0 {
        return 0.0;
    }

    let mut visited: HashSet<(i64, i64)> = HashSet::new();
    let mut revisits = 0usize;
    for f in fixations {
        let cx = ((f.start_x + f.end_x) / 2.0 / cell_px).floor() as i64;
        let cy = ((f.start_y + f.end_y) / 2.0 / cell_px).floor() as i64;
        if !visited.insert((cx, cy)) {
            revisits += 1;
        }
    }
    revisits as f64 / fixations.len() as f64
}
