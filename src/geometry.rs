// src/geometry.rs
//! Stateless measurements shared by every detector.
//!
//! All functions are total for a validated frame. Planar measures use x, y
//! only because detector depth is on a different, unstable scale.

use crate::landmarks::{Finger, HandFrame, HandLandmark, Landmark};

/// Straight-line distance in 3D.
pub fn euclidean_distance(a: &Landmark, b: &Landmark) -> f64 {
    (b - a).norm()
}

/// Distance in the image plane, ignoring depth.
pub fn planar_distance(a: &Landmark, b: &Landmark) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Mean of the wrist and the four base knuckles.
pub fn palm_center(frame: &HandFrame) -> Landmark {
    let base = HandLandmark::palm_base();
    let sum = base
        .iter()
        .fold(Landmark::zeros(), |acc, lm| acc + frame.point(*lm));
    sum / base.len() as f64
}

/// Wrist to middle-finger MCP; the per-hand normalization length.
pub fn hand_size(frame: &HandFrame) -> f64 {
    planar_distance(
        &frame.point(HandLandmark::Wrist),
        &frame.point(HandLandmark::MiddleMcp),
    )
}

/// Fingertip to palm-center distance in hand-size units.
pub fn finger_extension(frame: &HandFrame, finger: Finger) -> f64 {
    let size = hand_size(frame);
    if size <= f64::EPSILON {
        return 0.0;
    }
    planar_distance(&frame.tip(finger), &palm_center(frame)) / size
}

/// Mean fingertip to palm-center distance in hand-size units.
/// Grows as the hand opens; 0 for a degenerate (zero-size) hand.
pub fn normalized_spread(frame: &HandFrame) -> f64 {
    let size = hand_size(frame);
    if size <= f64::EPSILON {
        return 0.0;
    }
    let center = palm_center(frame);
    let total: f64 = Finger::ALL
        .iter()
        .map(|f| planar_distance(&frame.tip(*f), &center))
        .sum();
    total / Finger::ALL.len() as f64 / size
}

/// Depth change of a fingertip between two frames (negative = toward sensor).
pub fn depth_delta(prev: &HandFrame, curr: &HandFrame, finger: Finger) -> f64 {
    curr.tip(finger).z - prev.tip(finger).z
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic hands in pixel space, hand size 100 px.

    use crate::landmarks::{HandFrame, HandLandmark, Handedness, Landmark};

    const OPEN_HAND: [(f64, f64); 21] = [
        (600.0, 500.0), // wrist
        (560.0, 480.0),
        (530.0, 450.0),
        (510.0, 420.0),
        (500.0, 390.0), // thumb tip
        (570.0, 400.0),
        (565.0, 350.0),
        (562.0, 320.0),
        (560.0, 290.0), // index tip
        (600.0, 400.0),
        (600.0, 345.0),
        (600.0, 312.0),
        (600.0, 280.0), // middle tip
        (630.0, 405.0),
        (635.0, 355.0),
        (638.0, 325.0),
        (640.0, 298.0), // ring tip
        (655.0, 420.0),
        (665.0, 380.0),
        (670.0, 355.0),
        (675.0, 330.0), // pinky tip
    ];

    /// Relaxed open hand: spread ~1.3, thumb-index gap ~117 px.
    pub fn open_hand() -> HandFrame {
        HandFrame::new(
            OPEN_HAND
                .iter()
                .map(|(x, y)| Landmark::new(*x, *y, 0.0))
                .collect(),
            Handedness::Right,
            0.95,
        )
    }

    /// Fist with the thumb resting away from the index tip: spread ~0.26,
    /// thumb-index gap ~71 px (inside the default pinch band).
    pub fn fist() -> HandFrame {
        let mut frame = open_hand();
        set(&mut frame, HandLandmark::ThumbTip, 640.0, 470.0);
        set(&mut frame, HandLandmark::IndexTip, 590.0, 420.0);
        set(&mut frame, HandLandmark::MiddleTip, 610.0, 420.0);
        set(&mut frame, HandLandmark::RingTip, 630.0, 425.0);
        set(&mut frame, HandLandmark::PinkyTip, 640.0, 435.0);
        frame
    }

    /// Open hand with the thumb tip placed `gap` px left of the index tip.
    pub fn pinch_gap(gap: f64) -> HandFrame {
        let mut frame = open_hand();
        let index = frame.point(HandLandmark::IndexTip);
        set(&mut frame, HandLandmark::ThumbTip, index.x - gap, index.y);
        frame
    }

    pub fn set(frame: &mut HandFrame, landmark: HandLandmark, x: f64, y: f64) {
        let z = frame.landmarks[landmark.index()].z;
        frame.landmarks[landmark.index()] = Landmark::new(x, y, z);
    }

    /// Translate every landmark in the image plane.
    pub fn shifted(frame: &HandFrame, dx: f64, dy: f64) -> HandFrame {
        let mut out = frame.clone();
        for lm in out.landmarks.iter_mut() {
            lm.x += dx;
            lm.y += dy;
        }
        out
    }
}
