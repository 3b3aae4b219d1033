//! Velocity-Based Movement Classification
//!
//! Segments the filtered, velocity-tagged gaze stream into typed movement
//! events. This is a hysteresis state machine rather than a stateless
//! thresholder: the boundary between a saccade's end and the onset of the
//! following fixation is itself time-dependent, because the eye oscillates
//! (PSO) and drifts (glissade) for up to ~120 ms after landing.
//!
//! State criteria, evaluated per incoming frame:
//! - saccade: velocity above the saccade threshold
//! - pso: within the post-saccade window of a saccade's end while velocity
//!   stays above the PSO threshold
//! - glissade: between the post-saccade window and the glissade horizon
//!   while velocity stays above the PSO threshold
//! - fixation: velocity below the PSO threshold, or the glissade horizon has
//!   expired (post-saccade tracking is cleared at that point)
//! - unknown: anything else (tracking loss, mid-band velocity with no recent
//!   saccade)
//!
//! A type change finalizes the open event; events shorter than the minimum
//! duration are dropped as noise.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::tracking::sample_buffer::BoundedBuffer;
use crate::tracking::types::{FilteredFrame, MovementEvent, MovementKind};

/// Classifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Velocity above which a frame is saccadic (deg/s)
    pub saccade_velocity_threshold: f64,
    /// Velocity above which a post-saccadic frame is PSO/glissade (deg/s)
    pub pso_velocity_threshold: f64,
    /// PSO is only reachable within this window after a saccade ends (ms)
    pub post_saccade_window_ms: f64,
    /// Glissade horizon after a saccade ends (ms); post-saccade tracking is
    /// cleared once it expires
    pub glissade_window_ms: f64,
    /// Events shorter than this are discarded as noise (ms)
    pub min_event_duration_ms: f64,
    /// Leftward displacement beyond this tolerance marks a regression (px)
    pub regression_tolerance_px: f64,
    /// Fixations with spatial dispersion beyond this are demoted to unknown
    /// (tracking drift, not a fixation) (px)
    pub fixation_dispersion_px: f64,
    /// Saccades with amplitude below this are demoted to fixation
    /// (microsaccades do not interrupt a fixation) (deg)
    pub microsaccade_amplitude_deg: f64,
    /// Pixels per degree of visual angle (amplitude computation)
    pub pixels_per_degree: f64,
    /// Capacity of the sliding sample window
    pub sample_buffer_size: usize,
    /// Capacity of the finalized event history
    pub event_history_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            saccade_velocity_threshold: 30.0,
            pso_velocity_threshold: 15.0,
            post_saccade_window_ms: 80.0,
            glissade_window_ms: 120.0,
            min_event_duration_ms: 10.0,
            regression_tolerance_px: 20.0,
            fixation_dispersion_px: 100.0,
            microsaccade_amplitude_deg: 0.2,
            pixels_per_degree: 40.0,
            sample_buffer_size: 100,
            event_history_size: 500,
        }
    }
}

/// The currently-open, unfinalized event accumulator
#[derive(Debug, Clone, Copy)]
struct OpenEvent {
    kind: MovementKind,
    start_time_ms: f64,
    start_x: f64,
    start_y: f64,
    last_time_ms: f64,
    last_x: f64,
    last_y: f64,
    peak_velocity: f64,
    // Bounding box of accumulated samples, for dispersion checks
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl OpenEvent {
    fn start(kind: MovementKind, frame: &FilteredFrame) -> Self {
        Self {
            kind,
            start_time_ms: frame.timestamp_ms,
            start_x: frame.x,
            start_y: frame.y,
            last_time_ms: frame.timestamp_ms,
            last_x: frame.x,
            last_y: frame.y,
            peak_velocity: frame.velocity,
            min_x: frame.x,
            max_x: frame.x,
            min_y: frame.y,
            max_y: frame.y,
        }
    }

    fn accumulate(&mut self, frame: &FilteredFrame) {
        self.last_time_ms = frame.timestamp_ms;
        self.last_x = frame.x;
        self.last_y = frame.y;
        self.peak_velocity = self.peak_velocity.max(frame.velocity);
        self.min_x = self.min_x.min(frame.x);
        self.max_x = self.max_x.max(frame.x);
        self.min_y = self.min_y.min(frame.y);
        self.max_y = self.max_y.max(frame.y);
    }

    fn dispersion(&self) -> f64 {
        (self.max_x - self.min_x) + (self.max_y - self.min_y)
    }
}

/// Post-saccade tracking sub-state, armed when a saccade concludes and
/// cleared once the glissade horizon expires.
#[derive(Debug, Clone, Copy, Default)]
struct PostSaccade {
    active: bool,
    saccade_end_ms: f64,
    /// Signed horizontal displacement of the concluding saccade
    last_direction: f64,
}

/// The movement classifier state machine.
pub struct EventClassifier {
    config: ClassifierConfig,
    window: BoundedBuffer<FilteredFrame>,
    open: Option<OpenEvent>,
    post_saccade: PostSaccade,
    history: BoundedBuffer<MovementEvent>,
}

impl EventClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            window: BoundedBuffer::new(config.sample_buffer_size),
            open: None,
            post_saccade: PostSaccade::default(),
            history: BoundedBuffer::new(config.event_history_size),
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Feed one filtered frame through the state machine. Returns the live
    /// movement type detected for this frame.
    pub fn process(&mut self, frame: FilteredFrame) -> MovementKind {
        self.window.push(frame);

        // A saccade concludes the moment velocity drops back below the
        // threshold; arm post-saccade tracking before classifying so this
        // very frame can be recognized as PSO.
        if let Some(open) = &self.open {
            if open.kind.is_saccade()
                && frame.velocity <= self.config.saccade_velocity_threshold
                && !self.post_saccade.active
            {
                self.post_saccade = PostSaccade {
                    active: true,
                    saccade_end_ms: open.last_time_ms,
                    last_direction: open.last_x - open.start_x,
                };
                trace!(
                    saccade_end_ms = open.last_time_ms,
                    direction = self.post_saccade.last_direction,
                    "post-saccade tracking armed"
                );
            }
        }

        let kind = self.classify_frame(&frame);

        match &mut self.open {
            Some(open) if open.kind == kind => {
                open.accumulate(&frame);
            }
            Some(_) => {
                self.finalize_open();
                self.open = Some(OpenEvent::start(kind, &frame));
            }
            None => {
                self.open = Some(OpenEvent::start(kind, &frame));
            }
        }

        kind
    }

    /// State criteria for a single frame. Mutates only the post-saccade
    /// sub-state (cleared on a new saccade or when the glissade horizon
    /// expires).
    fn classify_frame(&mut self, frame: &FilteredFrame) -> MovementKind {
        let cfg = &self.config;

        if frame.velocity > cfg.saccade_velocity_threshold {
            // A new saccade supersedes any pending post-saccade tracking;
            // the oscillation window must be timed against this saccade's
            // end, not a stale one.
            self.post_saccade = PostSaccade::default();
            return MovementKind::Saccade;
        }

        if self.post_saccade.active {
            let elapsed = frame.timestamp_ms - self.post_saccade.saccade_end_ms;
            if elapsed > cfg.glissade_window_ms {
                // Horizon expired: back to plain velocity criteria
                self.post_saccade = PostSaccade::default();
            } else if frame.velocity > cfg.pso_velocity_threshold {
                if elapsed <= cfg.post_saccade_window_ms {
                    return MovementKind::Pso;
                }
                return MovementKind::Glissade;
            }
        }

        if frame.velocity <= cfg.pso_velocity_threshold {
            return MovementKind::Fixation;
        }

        // Mid-band velocity with no recent saccade: tracking loss or noise
        MovementKind::Unknown
    }

    /// Close the open event and append it to the history, unless it is too
    /// short to be meaningful.
    fn finalize_open(&mut self) {
        let open = match self.open.take() {
            Some(open) => open,
            None => return,
        };

        let duration_ms = open.last_time_ms - open.start_time_ms;
        if duration_ms < self.config.min_event_duration_ms {
            trace!(kind = %open.kind, duration_ms, "discarding sub-minimum event");
            return;
        }

        let dx = open.last_x - open.start_x;
        let dy = open.last_y - open.start_y;
        let amplitude = (dx * dx + dy * dy).sqrt() / self.config.pixels_per_degree;

        let mut kind = open.kind;
        if kind.is_fixation() && open.dispersion() > self.config.fixation_dispersion_px {
            // Slow drift across the screen is tracking drift, not fixation
            kind = MovementKind::Unknown;
        } else if kind.is_saccade() && amplitude < self.config.microsaccade_amplitude_deg {
            // Microsaccades stay part of the surrounding fixation
            kind = MovementKind::Fixation;
        }

        let event = MovementEvent {
            kind,
            start_time_ms: open.start_time_ms,
            end_time_ms: open.last_time_ms,
            duration_ms,
            start_x: open.start_x,
            start_y: open.start_y,
            end_x: open.last_x,
            end_y: open.last_y,
            peak_velocity: open.peak_velocity,
            amplitude,
            is_regression: dx < -self.config.regression_tolerance_px,
        };

        debug!(
            kind = %event.kind,
            duration_ms = event.duration_ms,
            amplitude = event.amplitude,
            peak_velocity = event.peak_velocity,
            is_regression = event.is_regression,
            "event finalized"
        );
        self.history.push(event);
    }

    /// Live movement type of the in-flight event (for real-time overlays).
    pub fn current_kind(&self) -> MovementKind {
        self.open.map(|o| o.kind).unwrap_or(MovementKind::Unknown)
    }

    /// Force-finalize the in-flight event, flushing the last segment into
    /// the history (e.g. at session end).
    pub fn finish(&mut self) {
        self.finalize_open();
        self.post_saccade = PostSaccade::default();
    }

    /// Finalized event history, oldest first.
    pub fn events(&self) -> Vec<MovementEvent> {
        self.history.to_vec()
    }

    /// Number of events dropped by the bounded history.
    pub fn evicted_events(&self) -> u64 {
        self.history.evicted_count()
    }

    /// Most recent filtered frames, oldest first (for debug overlays).
    pub fn recent_frames(&self) -> Vec<FilteredFrame> {
        self.window.to_vec()
    }

    /// Atomically clear the sample window, the in-flight event, and the
    /// post-saccade sub-state. The event history is preserved; see
    /// [`EventClassifier::clear_history`].
    pub fn reset(&mut self) {
        self.window.clear();
        self.open = None;
        self.post_saccade = PostSaccade::default();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f64, y: f64, t: f64, v: f64) -> FilteredFrame {
        FilteredFrame {
            x,
            y,
            timestamp_ms: t,
            velocity: v,
        }
    }

    fn classifier() -> EventClassifier {
        EventClassifier::new(ClassifierConfig::default())
    }

    #[test]
    fn test_first_frame_opens_fixation() {
        let mut c = classifier();
        let kind = c.process(frame(100.0, 100.0, 0.0, 0.0));
        assert_eq!(kind, MovementKind::Fixation);
        assert_eq!(c.current_kind(), MovementKind::Fixation);
        assert!(c.events().is_empty());
    }

    #[test]
    fn test_saccade_detection() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        let kind = c.process(frame(400.0, 100.0, 10.0, 400.0));
        assert_eq!(kind, MovementKind::Saccade);
    }

    #[test]
    fn test_type_change_finalizes_event() {
        let mut c = classifier();
        for i in 0..5 {
            c.process(frame(100.0, 100.0, i as f64 * 20.0, 2.0));
        }
        // Velocity spike changes the type, closing the fixation
        c.process(frame(400.0, 100.0, 100.0, 400.0));
        let events = c.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, MovementKind::Fixation);
        assert!((events[0].duration_ms - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_minimum_event_discarded() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 2.0));
        c.process(frame(100.0, 100.0, 5.0, 2.0));
        // 5 ms fixation, below the 10 ms minimum
        c.process(frame(300.0, 100.0, 15.0, 400.0));
        c.process(frame(300.0, 100.0, 30.0, 2.0));
        assert!(c.events().iter().all(|e| !e.kind.is_fixation()));
    }

    #[test]
    fn test_pso_only_within_post_saccade_window() {
        let mut c = classifier();
        // Mid-band velocity with no preceding saccade is not PSO
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        let kind = c.process(frame(105.0, 100.0, 20.0, 20.0));
        assert_eq!(kind, MovementKind::Unknown);
    }

    #[test]
    fn test_saccade_then_pso_then_fixation() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        // Saccade frames
        c.process(frame(250.0, 100.0, 25.0, 750.0));
        c.process(frame(400.0, 100.0, 35.0, 750.0));
        // Oscillation within 80 ms of the saccade end (t=35)
        let kind = c.process(frame(395.0, 100.0, 45.0, 25.0));
        assert_eq!(kind, MovementKind::Pso);
        let kind = c.process(frame(400.0, 100.0, 55.0, 25.0));
        assert_eq!(kind, MovementKind::Pso);
        // Settled
        let kind = c.process(frame(400.0, 100.0, 65.0, 2.0));
        assert_eq!(kind, MovementKind::Fixation);
    }

    #[test]
    fn test_glissade_between_windows() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        c.process(frame(250.0, 100.0, 25.0, 750.0));
        c.process(frame(400.0, 100.0, 35.0, 750.0));
        // 95 ms after saccade end (t=35): past the 80 ms PSO window, inside
        // the 120 ms glissade horizon
        let kind = c.process(frame(405.0, 100.0, 130.0, 20.0));
        assert_eq!(kind, MovementKind::Glissade);
    }

    #[test]
    fn test_post_saccade_rearmed_for_consecutive_saccades() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        // First saccade ends at t=10
        c.process(frame(250.0, 100.0, 5.0, 750.0));
        c.process(frame(400.0, 100.0, 10.0, 750.0));
        let kind = c.process(frame(405.0, 100.0, 20.0, 25.0));
        assert_eq!(kind, MovementKind::Pso);
        // Corrective saccade ~100 ms later, ending at t=110
        c.process(frame(600.0, 100.0, 100.0, 750.0));
        c.process(frame(700.0, 100.0, 110.0, 750.0));
        // Oscillation 10 ms after the SECOND saccade's end must be PSO,
        // not timed against the first saccade's end
        let kind = c.process(frame(705.0, 100.0, 120.0, 20.0));
        assert_eq!(kind, MovementKind::Pso);
    }

    #[test]
    fn test_post_saccade_horizon_expiry() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        c.process(frame(250.0, 100.0, 25.0, 750.0));
        c.process(frame(400.0, 100.0, 35.0, 750.0));
        // 125 ms after saccade end: horizon expired, mid-band velocity is
        // unknown again
        let kind = c.process(frame(405.0, 100.0, 160.0, 20.0));
        assert_eq!(kind, MovementKind::Unknown);
    }

    #[test]
    fn test_regression_flag() {
        let mut c = classifier();
        c.process(frame(400.0, 100.0, 0.0, 0.0));
        c.process(frame(400.0, 100.0, 20.0, 1.0));
        // Leftward saccade well beyond the 20 px tolerance
        c.process(frame(250.0, 100.0, 25.0, 750.0));
        c.process(frame(100.0, 100.0, 35.0, 750.0));
        c.process(frame(100.0, 100.0, 45.0, 2.0));
        c.finish();

        let saccades: Vec<_> = c.events().into_iter().filter(|e| e.kind.is_saccade()).collect();
        assert_eq!(saccades.len(), 1);
        assert!(saccades[0].is_regression);
    }

    #[test]
    fn test_rightward_saccade_not_regression() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        c.process(frame(250.0, 100.0, 25.0, 750.0));
        c.process(frame(400.0, 100.0, 35.0, 750.0));
        c.process(frame(400.0, 100.0, 45.0, 2.0));
        c.finish();

        let saccades: Vec<_> = c.events().into_iter().filter(|e| e.kind.is_saccade()).collect();
        assert_eq!(saccades.len(), 1);
        assert!(!saccades[0].is_regression);
    }

    #[test]
    fn test_peak_velocity_recorded() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        c.process(frame(200.0, 100.0, 25.0, 500.0));
        c.process(frame(350.0, 100.0, 30.0, 820.0));
        c.process(frame(400.0, 100.0, 35.0, 300.0));
        c.process(frame(400.0, 100.0, 45.0, 2.0));
        c.finish();

        let saccade = c
            .events()
            .into_iter()
            .find(|e| e.kind.is_saccade())
            .expect("saccade emitted");
        assert_eq!(saccade.peak_velocity, 820.0);
    }

    #[test]
    fn test_finish_flushes_open_event() {
        let mut c = classifier();
        for i in 0..5 {
            c.process(frame(100.0, 100.0, i as f64 * 100.0, 2.0));
        }
        assert!(c.events().is_empty());
        c.finish();
        let events = c.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration_ms, 400.0);
    }

    #[test]
    fn test_microsaccade_demoted_to_fixation() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 0.0));
        c.process(frame(100.0, 100.0, 20.0, 1.0));
        // 2 px start-to-end displacement = 0.05 deg, below the 0.2 deg floor
        c.process(frame(102.0, 100.0, 25.0, 40.0));
        c.process(frame(104.0, 100.0, 35.0, 40.0));
        c.process(frame(104.0, 100.0, 45.0, 2.0));
        c.finish();
        assert!(c.events().iter().all(|e| !e.kind.is_saccade()));
    }

    #[test]
    fn test_drifting_fixation_demoted_to_unknown() {
        let mut c = classifier();
        // Slow drift spanning 200 px at sub-PSO velocity
        for i in 0..20 {
            c.process(frame(100.0 + i as f64 * 10.0, 100.0, i as f64 * 50.0, 5.0));
        }
        c.finish();
        let events = c.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, MovementKind::Unknown);
    }

    #[test]
    fn test_determinism() {
        let input: Vec<FilteredFrame> = (0..200)
            .map(|i| {
                let t = i as f64 * 10.0;
                if i % 37 < 3 {
                    frame(100.0 + i as f64 * 15.0, 200.0, t, 500.0)
                } else {
                    frame(100.0 + i as f64, 200.0, t, 3.0)
                }
            })
            .collect();

        let mut a = classifier();
        let mut b = classifier();
        for f in &input {
            a.process(*f);
            b.process(*f);
        }
        a.finish();
        b.finish();
        assert_eq!(a.events(), b.events());
        assert!(!a.events().is_empty());
    }

    #[test]
    fn test_history_bounded() {
        let mut config = ClassifierConfig::default();
        config.event_history_size = 4;
        let mut c = EventClassifier::new(config);

        // Alternate fixation / saccade segments to finalize many events
        let mut t = 0.0;
        for _ in 0..20 {
            for _ in 0..3 {
                c.process(frame(100.0, 100.0, t, 2.0));
                t += 20.0;
            }
            for _ in 0..2 {
                c.process(frame(400.0, 100.0, t, 500.0));
                t += 20.0;
            }
        }
        c.finish();
        assert_eq!(c.events().len(), 4);
        assert!(c.evicted_events() > 0);
    }

    #[test]
    fn test_reset_clears_runtime_but_keeps_history() {
        let mut c = classifier();
        c.process(frame(100.0, 100.0, 0.0, 2.0));
        c.process(frame(100.0, 100.0, 20.0, 2.0));
        c.process(frame(400.0, 100.0, 30.0, 500.0));
        assert_eq!(c.events().len(), 1);

        c.reset();
        assert_eq!(c.current_kind(), MovementKind::Unknown);
        assert!(c.recent_frames().is_empty());
        assert_eq!(c.events().len(), 1);

        // No partial event leaks out after reset
        c.process(frame(500.0, 500.0, 1000.0, 2.0));
        c.process(frame(500.0, 500.0, 1020.0, 2.0));
        c.finish();
        let events = c.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].start_time_ms, 1000.0);
    }
}
