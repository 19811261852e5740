// src/recognizer/mod.rs
//! Per-frame gesture classification with temporal stabilization.
//!
//! Four independent detectors (pinch, tap, swipe, palm) look at every usable
//! frame. Each debounces its own candidates; the recognizer then applies the
//! confidence floor, the global cooldown and the priority order, so at most
//! one event leaves a tick.
//!
//! A `GestureRecognizer` is a single-owner object. Sharing one across
//! threads needs external serialization.

mod debounce;
mod hysteresis;
mod swipe;
mod tap;

use serde::Serialize;
use tracing::{debug, warn};

pub use debounce::{Candidate, Cooldown, Debouncer};
pub use hysteresis::{HandState, HysteresisDetector};
pub use swipe::SwipeDetector;
pub use tap::TapDetector;

use crate::config::{ConfigError, GestureConfig};
use crate::geometry::{normalized_spread, palm_center, planar_distance};
use crate::gesture::GestureEvent;
use crate::landmarks::{Finger, HandFrame};

/// Counters for every way a tick can end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecognizerStats {
    /// Frames that reached the detectors.
    pub processed: u64,
    /// Malformed frames.
    pub rejected: u64,
    /// Frames under the minimum detection confidence.
    pub low_confidence: u64,
    /// Ticks without a usable frame (includes the two above).
    pub missing_ticks: u64,
    pub hand_lost_resets: u64,
    pub emitted: u64,
    pub suppressed_cooldown: u64,
    pub below_confidence: u64,
}

pub struct GestureRecognizer {
    pinch: HysteresisDetector,
    tap: TapDetector,
    swipe: SwipeDetector,
    palm: HysteresisDetector,
    cooldown: Cooldown,
    confidence_threshold: f64,
    min_detection_confidence: f64,
    hand_lost_frames: u32,
    missing_streak: u32,
    hand_lost: bool,
    stats: RecognizerStats,
}

impl GestureRecognizer {
    pub fn new(config: &GestureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let stab = &config.stabilization;
        Ok(Self {
            pinch: HysteresisDetector::pinch(config.pinch.band(), stab.debounce_frames),
            tap: TapDetector::new(config.tap.clone(), stab.debounce_frames),
            swipe: SwipeDetector::new(config.swipe.clone(), stab.debounce_frames),
            palm: HysteresisDetector::palm(config.palm.band(), stab.debounce_frames),
            cooldown: Cooldown::new(stab.cooldown_secs),
            confidence_threshold: stab.confidence_threshold,
            min_detection_confidence: stab.min_detection_confidence,
            hand_lost_frames: stab.hand_lost_frames,
            missing_streak: 0,
            hand_lost: false,
            stats: RecognizerStats::default(),
        })
    }

    /// Whether a raw frame is fit for the detectors. Rejections are counted
    /// here; the caller should then treat the tick as missing.
    pub fn admit(&mut self, frame: &HandFrame) -> bool {
        if let Err(e) = frame.validate() {
            warn!("Rejected hand frame: {}", e);
            self.stats.rejected += 1;
            return false;
        }
        if frame.confidence < self.min_detection_confidence {
            debug!(
                "Low detection confidence {:.2} < {:.2}",
                frame.confidence, self.min_detection_confidence
            );
            self.stats.low_confidence += 1;
            return false;
        }
        true
    }

    /// Advance one tick. `frame` is `None` when nothing was detected.
    pub fn tick(&mut self, timestamp: f64, frame: Option<&HandFrame>) -> Option<GestureEvent> {
        let Some(frame) = frame.filter(|f| self.admit(f)) else {
            self.register_missing();
            return None;
        };

        self.missing_streak = 0;
        self.hand_lost = false;
        self.stats.processed += 1;

        let gap = planar_distance(&frame.tip(Finger::Thumb), &frame.tip(Finger::Index));
        let spread = normalized_spread(frame);
        let center = palm_center(frame);

        // every detector sees the frame, in priority order
        let confirmed = [
            self.pinch.update(gap),
            self.tap.update(frame),
            self.swipe.update(timestamp, center),
            self.palm.update(spread),
        ];

        let mut emitted: Option<GestureEvent> = None;
        for candidate in confirmed.into_iter().flatten() {
            if candidate.confidence < self.confidence_threshold {
                debug!(
                    "Discarded {} at confidence {:.3}",
                    candidate.kind, candidate.confidence
                );
                self.stats.below_confidence += 1;
                continue;
            }
            if emitted.is_some() || self.cooldown.is_active(timestamp) {
                debug!("Suppressed {} during cooldown", candidate.kind);
                self.stats.suppressed_cooldown += 1;
                continue;
            }
            debug!(
                "Gesture {} confirmed (confidence {:.3})",
                candidate.kind, candidate.confidence
            );
            self.cooldown.start(timestamp);
            self.stats.emitted += 1;
            emitted = Some(candidate.into_event(timestamp));
        }
        emitted
    }

    fn register_missing(&mut self) {
        self.stats.missing_ticks += 1;
        self.missing_streak = self.missing_streak.saturating_add(1);

        self.pinch.interrupt();
        self.tap.interrupt();
        self.swipe.interrupt();
        self.palm.interrupt();

        if !self.hand_lost && self.missing_streak >= self.hand_lost_frames {
            debug!(
                "Hand lost after {} missing ticks, resetting detectors",
                self.missing_streak
            );
            self.reset_detectors();
            self.hand_lost = true;
            self.stats.hand_lost_resets += 1;
        }
    }

    fn reset_detectors(&mut self) {
        self.pinch.reset();
        self.tap.reset();
        self.swipe.reset();
        self.palm.reset();
    }

    /// True from the tick the hand-lost reset happened until the next usable
    /// frame.
    pub fn hand_lost(&self) -> bool {
        self.hand_lost
    }

    pub fn stats(&self) -> RecognizerStats {
        self.stats
    }

    pub fn pinch_state(&self) -> Option<HandState> {
        self.pinch.state()
    }

    pub fn palm_state(&self) -> Option<HandState> {
        self.palm.state()
    }

    /// Back to the freshly constructed state; counters are kept.
    pub fn reset(&mut self) {
        self.reset_detectors();
        self.cooldown.clear();
        self.missing_streak = 0;
        self.hand_lost = false;
    }
}
