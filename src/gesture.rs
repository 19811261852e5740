// src/gesture.rs
//! Gesture kinds and the events the recognizer emits.

use serde::{Deserialize, Serialize};

/// Recognized gesture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Thumb and index tips came together.
    PinchIn,
    /// Thumb and index tips moved apart.
    PinchOut,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    /// Index fingertip pushed toward the sensor.
    Tap,
    /// Hand opened from a fist.
    PalmOpen,
    /// Hand closed into a fist.
    PalmClose,
}

impl GestureKind {
    pub const ALL: [GestureKind; 9] = [
        GestureKind::PinchIn,
        GestureKind::PinchOut,
        GestureKind::SwipeLeft,
        GestureKind::SwipeRight,
        GestureKind::SwipeUp,
        GestureKind::SwipeDown,
        GestureKind::Tap,
        GestureKind::PalmOpen,
        GestureKind::PalmClose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PinchIn => "pinch_in",
            Self::PinchOut => "pinch_out",
            Self::SwipeLeft => "swipe_left",
            Self::SwipeRight => "swipe_right",
            Self::SwipeUp => "swipe_up",
            Self::SwipeDown => "swipe_down",
            Self::Tap => "tap",
            Self::PalmOpen => "palm_open",
            Self::PalmClose => "palm_close",
        }
    }

    pub fn is_swipe(&self) -> bool {
        matches!(
            self,
            Self::SwipeLeft | Self::SwipeRight | Self::SwipeUp | Self::SwipeDown
        )
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Continuous measurements attached to an event. Which fields are set
/// depends on the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureParameters {
    /// Pinch gap or swipe displacement, in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Swipe speed in pixels per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Fingertip depth change for taps (detector units).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_change: Option<f64>,
    /// Normalized spread for palm transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

/// A confirmed, debounced gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    /// Heuristic in [0, 1]: how far past threshold the measurement was.
    pub confidence: f64,
    /// Seconds, on the caller's clock.
    pub timestamp: f64,
    #[serde(default)]
    pub parameters: GestureParameters,
}

/// `(margin past threshold) / threshold`, clamped to [0, 1].
pub fn margin_confidence(margin: f64, threshold: f64) -> f64 {
    if threshold.abs() <= f64::EPSILON {
        return if margin > 0.0 { 1.0 } else { 0.0 };
    }
    (margin / threshold.abs()).clamp(0.0, 1.0)
}
