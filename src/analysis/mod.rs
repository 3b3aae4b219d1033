//! Movement classification, reading metrics, and clinical risk scoring.

pub mod event_classifier;
pub mod metrics;
pub mod scoring;

pub use event_classifier::{ClassifierConfig, EventClassifier};
pub use metrics::ReadingMetrics;
pub use scoring::{DyslexiaScore, DyslexiaScorer, RiskLevel, ScoringConfig};
