// src/recognizer/swipe.rs
//! Directional flicks of the whole hand, measured on the palm center.

use std::collections::VecDeque;

use tracing::debug;

use super::debounce::{Candidate, Debouncer};
use crate::config::SwipeConfig;
use crate::gesture::{margin_confidence, GestureKind, GestureParameters};
use crate::landmarks::Landmark;

/// Upper bound on buffered samples regardless of frame rate.
const MAX_SAMPLES: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Sample {
    timestamp: f64,
    center: Landmark,
}

/// Time-windowed palm trajectory. Samples older than the maximum swipe
/// duration are evicted, so a slow drift never accumulates into a swipe.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    config: SwipeConfig,
    samples: VecDeque<Sample>,
    debouncer: Debouncer,
}

impl SwipeDetector {
    pub fn new(config: SwipeConfig, debounce_frames: u32) -> Self {
        Self {
            config,
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            debouncer: Debouncer::new(debounce_frames),
        }
    }

    pub fn buffered(&self) -> usize {
        self.samples.len()
    }

    fn push(&mut self, timestamp: f64, center: Landmark) {
        if self
            .samples
            .back()
            .map_or(false, |last| timestamp < last.timestamp)
        {
            debug!("swipe buffer cleared: timestamp went backwards");
            self.samples.clear();
        }

        self.samples.push_back(Sample { timestamp, center });

        let horizon = timestamp - self.config.max_duration_secs;
        while self
            .samples
            .front()
            .map_or(false, |s| s.timestamp < horizon)
        {
            self.samples.pop_front();
        }
        while self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }
    }

    fn classify(&self) -> Option<Candidate> {
        if self.samples.len() < self.config.min_samples {
            return None;
        }
        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;

        let elapsed = newest.timestamp - oldest.timestamp;
        if elapsed <= 0.0 || elapsed > self.config.max_duration_secs {
            return None;
        }

        let dx = newest.center.x - oldest.center.x;
        let dy = newest.center.y - oldest.center.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= self.config.threshold {
            return None;
        }

        let velocity = distance / elapsed;
        if velocity < self.config.min_velocity {
            return None;
        }

        let (major, minor) = if dx.abs() >= dy.abs() {
            (dx.abs(), dy.abs())
        } else {
            (dy.abs(), dx.abs())
        };
        if minor / major >= self.config.direction_tolerance {
            return None;
        }

        // image y grows downward
        let kind = match (dx.abs() >= dy.abs(), dx > 0.0, dy > 0.0) {
            (true, true, _) => GestureKind::SwipeRight,
            (true, false, _) => GestureKind::SwipeLeft,
            (false, _, true) => GestureKind::SwipeDown,
            (false, _, false) => GestureKind::SwipeUp,
        };

        Some(Candidate {
            kind,
            confidence: margin_confidence(distance - self.config.threshold, self.config.threshold),
            parameters: GestureParameters {
                distance: Some(distance),
                velocity: Some(velocity),
                ..Default::default()
            },
        })
    }

    pub fn update(&mut self, timestamp: f64, center: Landmark) -> Option<Candidate> {
        self.push(timestamp, center);
        let confirmed = self.debouncer.observe(self.classify())?;
        self.samples.clear();
        Some(confirmed)
    }

    pub fn interrupt(&mut self) {
        self.debouncer.clear();
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.debouncer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(debounce: u32) -> SwipeDetector {
        SwipeDetector::new(SwipeConfig::default(), debounce)
    }

    /// Linear motion from (600, 400) by (dx, dy) over `duration`, `steps`
    /// intervals.
    fn run(
        detector: &mut SwipeDetector,
        dx: f64,
        dy: f64,
        duration: f64,
        steps: usize,
    ) -> Vec<Candidate> {
        (0..=steps)
            .filter_map(|i| {
                let f = i as f64 / steps as f64;
                detector.update(
                    f * duration,
                    Landmark::new(600.0 + f * dx, 400.0 + f * dy, 0.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_horizontal_swipe_right() {
        let mut swipe = detector(1);
        let fired = run(&mut swipe, 120.0, 10.0, 0.15, 3);
        assert_eq!(fired.len(), 1);
        let event = fired[0];
        assert_eq!(event.kind, GestureKind::SwipeRight);
        let distance = event.parameters.distance.unwrap();
        assert!((distance - (120.0f64.powi(2) + 10.0f64.powi(2)).sqrt()).abs() < 1e-9);
        assert!((event.parameters.velocity.unwrap() - distance / 0.15).abs() < 1e-6);
        assert_eq!(swipe.buffered(), 0);
    }

    #[test]
    fn test_direction_by_sign() {
        let cases = [
            (-150.0, 5.0, GestureKind::SwipeLeft),
            (0.0, -150.0, GestureKind::SwipeUp),
            (8.0, 150.0, GestureKind::SwipeDown),
        ];
        for (dx, dy, kind) in cases {
            let mut swipe = detector(1);
            let fired = run(&mut swipe, dx, dy, 0.2, 4);
            assert_eq!(fired.iter().map(|c| c.kind).collect::<Vec<_>>(), vec![kind]);
        }
    }

    #[test]
    fn test_diagonal_motion_is_rejected() {
        let mut swipe = detector(1);
        assert!(run(&mut swipe, 120.0, 60.0, 0.15, 3).is_empty());
    }

    #[test]
    fn test_short_motion_is_rejected() {
        let mut swipe = detector(1);
        assert!(run(&mut swipe, 90.0, 0.0, 0.15, 3).is_empty());
    }

    #[test]
    fn test_slow_drift_is_evicted() {
        let mut swipe = detector(1);
        // 300 px over 3 s never has more than ~30 px inside the window
        assert!(run(&mut swipe, 300.0, 0.0, 3.0, 90).is_empty());
        assert!(swipe.buffered() <= 11);
    }

    #[test]
    fn test_debounce_needs_consecutive_ticks() {
        let mut swipe = detector(2);
        let fired = run(&mut swipe, 150.0, 0.0, 0.15, 6);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, GestureKind::SwipeRight);
    }

    #[test]
    fn test_reset_forgets_samples() {
        let mut swipe = detector(1);
        swipe.update(0.0, Landmark::new(600.0, 400.0, 0.0));
        swipe.reset();
        assert!(swipe
            .update(0.1, Landmark::new(800.0, 400.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_backwards_clock_clears_buffer() {
        let mut swipe = detector(1);
        swipe.update(5.0, Landmark::new(600.0, 400.0, 0.0));
        assert!(swipe
            .update(1.0, Landmark::new(800.0, 400.0, 0.0))
            .is_none());
        assert_eq!(swipe.buffered(), 1);
    }
}
