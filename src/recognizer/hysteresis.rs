// src/recognizer/hysteresis.rs
//! Two-state detectors driven by one scalar measurement (pinch gap, palm
//! spread).

use tracing::debug;

use super::debounce::{Candidate, Debouncer};
use crate::config::HysteresisBand;
use crate::gesture::{margin_confidence, GestureKind, GestureParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandState {
    Open,
    Closed,
}

/// Open/Closed state machine with a dead band between the thresholds.
///
/// A measurement below `close` proposes Closed, above `open` proposes Open;
/// inside the band nothing is proposed and the state holds. The state only
/// commits once the debouncer confirms the transition.
#[derive(Debug, Clone)]
pub struct HysteresisDetector {
    name: &'static str,
    band: HysteresisBand,
    initial: Option<HandState>,
    state: Option<HandState>,
    close_kind: GestureKind,
    open_kind: GestureKind,
    parameters: fn(f64) -> GestureParameters,
    debouncer: Debouncer,
}

impl HysteresisDetector {
    /// Thumb-index gap in pixels; starts Open.
    pub fn pinch(band: HysteresisBand, debounce_frames: u32) -> Self {
        Self {
            name: "pinch",
            band,
            initial: Some(HandState::Open),
            state: Some(HandState::Open),
            close_kind: GestureKind::PinchIn,
            open_kind: GestureKind::PinchOut,
            parameters: |gap| GestureParameters {
                distance: Some(gap),
                ..Default::default()
            },
            debouncer: Debouncer::new(debounce_frames),
        }
    }

    /// Normalized spread. The first reading outside the band sets the
    /// state silently.
    pub fn palm(band: HysteresisBand, debounce_frames: u32) -> Self {
        Self {
            name: "palm",
            band,
            initial: None,
            state: None,
            close_kind: GestureKind::PalmClose,
            open_kind: GestureKind::PalmOpen,
            parameters: |spread| GestureParameters {
                spread: Some(spread),
                ..Default::default()
            },
            debouncer: Debouncer::new(debounce_frames),
        }
    }

    pub fn state(&self) -> Option<HandState> {
        self.state
    }

    fn target(&self, measurement: f64) -> Option<HandState> {
        if measurement < self.band.close {
            Some(HandState::Closed)
        } else if measurement > self.band.open {
            Some(HandState::Open)
        } else {
            None
        }
    }

    /// Returns the confirmed transition, if any. The new state is committed
    /// whether or not the caller ends up emitting the event.
    pub fn update(&mut self, measurement: f64) -> Option<Candidate> {
        let target = self.target(measurement);

        let Some(current) = self.state else {
            if let Some(seed) = target {
                debug!("{} state initialized to {:?}", self.name, seed);
                self.state = Some(seed);
            }
            return None;
        };

        let candidate = match target {
            Some(HandState::Closed) if current == HandState::Open => Some(Candidate {
                kind: self.close_kind,
                confidence: margin_confidence(self.band.close - measurement, self.band.close),
                parameters: (self.parameters)(measurement),
            }),
            Some(HandState::Open) if current == HandState::Closed => Some(Candidate {
                kind: self.open_kind,
                confidence: margin_confidence(measurement - self.band.open, self.band.open),
                parameters: (self.parameters)(measurement),
            }),
            _ => None,
        };

        let confirmed = self.debouncer.observe(candidate)?;
        self.state = target;
        debug!("{} committed {:?}", self.name, self.state);
        Some(confirmed)
    }

    /// Drop a pending run without touching the committed state.
    pub fn interrupt(&mut self) {
        self.debouncer.clear();
    }

    pub fn reset(&mut self) {
        self.state = self.initial;
        self.debouncer.clear();
    }
}
