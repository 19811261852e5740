// src/landmarks.rs
//! Hand landmark frames as produced by the external 21-point detector.
//!
//! Coordinates arrive with x, y normalized to the camera frame and z as a
//! detector-relative depth (smaller = closer to the sensor, no fixed scale).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single tracked point (x, y, z).
pub type Landmark = Vector3<f64>;

/// Number of landmarks in every hand frame.
pub const LANDMARK_COUNT: usize = 21;

/// The 21 hand landmarks, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandLandmark {
    /// Index into `HandFrame::landmarks` (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wrist plus the four base knuckles; their mean is the palm center.
    pub fn palm_base() -> [HandLandmark; 5] {
        [
            Self::Wrist,
            Self::IndexMcp,
            Self::MiddleMcp,
            Self::RingMcp,
            Self::PinkyMcp,
        ]
    }
}

/// One of the five digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Thumb => HandLandmark::ThumbTip,
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        }
    }
}

/// Reasons a frame is rejected before it reaches the detectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("expected {expected} landmarks, found {found}")]
    LandmarkCount { expected: usize, found: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("detection confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
}

fn full_confidence() -> f64 {
    1.0
}

/// One detector result: 21 landmarks, handedness and detection confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub handedness: Handedness,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl HandFrame {
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness, confidence: f64) -> Self {
        Self {
            landmarks,
            handedness,
            confidence,
        }
    }

    /// Check the shape and numeric sanity of the frame.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.landmarks.len() != LANDMARK_COUNT {
            return Err(FrameError::LandmarkCount {
                expected: LANDMARK_COUNT,
                found: self.landmarks.len(),
            });
        }
        if let Some(index) = self
            .landmarks
            .iter()
            .position(|lm| !lm.iter().all(|c| c.is_finite()))
        {
            return Err(FrameError::NonFiniteCoordinate { index });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(FrameError::InvalidConfidence(self.confidence));
        }
        Ok(())
    }

    /// Position of a landmark. Missing points read as the origin so callers
    /// never index out of bounds; frames are validated before use.
    pub fn point(&self, landmark: HandLandmark) -> Landmark {
        self.landmarks
            .get(landmark.index())
            .copied()
            .unwrap_or_else(Landmark::zeros)
    }

    pub fn tip(&self, finger: Finger) -> Landmark {
        self.point(finger.tip())
    }

    /// Scale normalized x, y into pixel units; z is left in detector units.
    pub fn to_pixel_space(&self, width: f64, height: f64) -> HandFrame {
        HandFrame {
            landmarks: self
                .landmarks
                .iter()
                .map(|lm| Landmark::new(lm.x * width, lm.y * height, lm.z))
                .collect(),
            handedness: self.handedness,
            confidence: self.confidence,
        }
    }
}
