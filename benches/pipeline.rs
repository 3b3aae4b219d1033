//! Criterion benchmarks for performance-critical hot paths
//!
//! Covers: per-sample smoothing, per-frame classification, the full
//! sample-to-event pipeline, and risk scoring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gaze_analyzer::analysis::event_classifier::{ClassifierConfig, EventClassifier};
use gaze_analyzer::analysis::scoring::{DyslexiaScorer, ScoringConfig};
use gaze_analyzer::app::config::Config;
use gaze_analyzer::filtering::calibration::CalibrationModel;
use gaze_analyzer::filtering::smoothing::{FilterConfig, SmoothingFilter};
use gaze_analyzer::session::GazeSession;
use gaze_analyzer::tracking::types::{FilteredFrame, GazeSample, MovementEvent, MovementKind};

/// Synthetic reading pass: jittery fixations separated by saccadic jumps,
/// with a regression every fifth hop. 50 Hz sampling.
fn generate_reading_samples(n: usize) -> Vec<GazeSample> {
    let mut samples = Vec::with_capacity(n);
    let mut t = 0.0;
    let mut x = 100.0;
    let mut i = 0usize;
    while samples.len() < n {
        // 10 fixation samples, then one jump
        for k in 0..10 {
            if samples.len() >= n {
                break;
            }
            let jitter = ((i + k) % 3) as f64 - 1.0;
            samples.push(GazeSample::new(x + jitter, 300.0, t));
            t += 20.0;
        }
        if i % 5 == 4 {
            x -= 180.0;
        } else {
            x += 120.0;
        }
        if x < 100.0 || x > 1800.0 {
            x = 100.0;
        }
        i += 1;
    }
    samples
}

fn generate_frames(n: usize) -> Vec<FilteredFrame> {
    let mut filter = SmoothingFilter::new(FilterConfig::default());
    generate_reading_samples(n)
        .into_iter()
        .map(|s| filter.process(s))
        .collect()
}

fn generate_events(fixation_count: usize) -> (Vec<MovementEvent>, Vec<MovementEvent>) {
    let mut fixations = Vec::with_capacity(fixation_count);
    let mut saccades = Vec::with_capacity(fixation_count);
    let mut t = 0.0;
    for i in 0..fixation_count {
        let x = 100.0 + (i % 12) as f64 * 140.0;
        fixations.push(MovementEvent {
            kind: MovementKind::Fixation,
            start_time_ms: t,
            end_time_ms: t + 220.0,
            duration_ms: 220.0,
            start_x: x,
            start_y: 300.0,
            end_x: x,
            end_y: 300.0,
            peak_velocity: 5.0,
            amplitude: 0.0,
            is_regression: false,
        });
        t += 220.0;
        saccades.push(MovementEvent {
            kind: MovementKind::Saccade,
            start_time_ms: t,
            end_time_ms: t + 30.0,
            duration_ms: 30.0,
            start_x: x,
            start_y: 300.0,
            end_x: x + 140.0,
            end_y: 300.0,
            peak_velocity: 350.0,
            amplitude: 3.5,
            is_regression: false,
        });
        t += 30.0;
    }
    (fixations, saccades)
}

// ---------------------------------------------------------------------------
// Smoothing benchmarks
// ---------------------------------------------------------------------------

fn bench_smoothing_process(c: &mut Criterion) {
    c.bench_function("smoothing_process", |b| {
        let mut filter = SmoothingFilter::new(FilterConfig::default());
        let mut t = 0.0;
        b.iter(|| {
            t += 20.0;
            let frame = filter.process(black_box(GazeSample::new(500.0, 400.0, t)));
            black_box(frame);
        });
    });
}

fn bench_calibration_apply(c: &mut Criterion) {
    let mut model = CalibrationModel::new(1920.0, 1080.0, 1e-6);
    for &(x, y) in &[
        (160.0, 90.0),
        (1760.0, 90.0),
        (160.0, 990.0),
        (1760.0, 990.0),
        (960.0, 540.0),
    ] {
        model.add_point(GazeSample::new(x, y, 0.0), 0.9 * x + 30.0, 0.85 * y + 20.0);
    }
    model.train().expect("calibration grid should train");

    c.bench_function("calibration_apply", |b| {
        b.iter(|| {
            let mapped = model.apply(black_box(960.0), black_box(540.0));
            black_box(mapped);
        });
    });
}

// ---------------------------------------------------------------------------
// Classification benchmarks
// ---------------------------------------------------------------------------

fn bench_classifier_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier_process");

    for count in [100, 1000, 5000] {
        let frames = generate_frames(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &frames, |b, frames| {
            b.iter(|| {
                let mut classifier = EventClassifier::new(ClassifierConfig::default());
                for frame in frames {
                    black_box(classifier.process(black_box(*frame)));
                }
                classifier.finish();
                black_box(classifier.events());
            });
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("full_pipeline");

    for count in [100, 1000, 5000] {
        let samples = generate_reading_samples(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| {
                let mut session = GazeSession::new(&config);
                for sample in samples {
                    let _ = black_box(session.process_sample(black_box(*sample)));
                }
                session.finish();
                black_box(session.events());
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Scoring benchmarks
// ---------------------------------------------------------------------------

fn bench_scoring(c: &mut Criterion) {
    let scorer = DyslexiaScorer::new(ScoringConfig::default());
    let mut group = c.benchmark_group("scoring");

    for count in [50, 200, 1000] {
        let (fixations, saccades) = generate_events(count);
        let total_ms = count as f64 * 250.0;
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &(fixations, saccades),
            |b, (fixations, saccades)| {
                b.iter(|| {
                    let score = scorer.score(
                        black_box(fixations),
                        black_box(saccades),
                        black_box(total_ms),
                        black_box(1200),
                    );
                    black_box(score);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_smoothing_process,
    bench_calibration_apply,
    bench_classifier_process,
    bench_full_pipeline,
    bench_scoring,
);
criterion_main!(benches);
