// src/smoothing.rs
//! Temporal low-pass filtering of raw landmark frames.

use std::collections::VecDeque;

use nalgebra::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};
use tracing::debug;

use crate::config::{SmoothingConfig, SmoothingMethod};
use crate::landmarks::{HandFrame, Landmark};

/// Constant-velocity filter for one landmark.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    state: Vector6<f64>, // [x, y, z, vx, vy, vz]
    covariance: Matrix6<f64>,
    process_noise: Matrix6<f64>,
    measurement_noise: Matrix3<f64>,
    dt: f64,
}

impl KalmanFilter {
    /// Start at `initial` with zero velocity.
    pub fn seeded(initial: Landmark, dt: f64) -> Self {
        let mut process_noise = Matrix6::identity() * 0.1;
        process_noise.fixed_view_mut::<3, 3>(3, 3).fill_diagonal(0.2);

        let mut state = Vector6::zeros();
        state.fixed_rows_mut::<3>(0).copy_from(&initial);

        Self {
            state,
            covariance: Matrix6::identity(),
            process_noise,
            measurement_noise: Matrix3::identity() * 0.1,
            dt,
        }
    }

    pub fn predict(&mut self) {
        let mut f = Matrix6::identity();
        f.fixed_view_mut::<3, 3>(0, 3).fill_diagonal(self.dt);

        self.state = f * self.state;
        self.covariance = f * self.covariance * f.transpose() + self.process_noise;
    }

    /// Fold in a position measurement. Returns false (and keeps the
    /// prediction) if the innovation covariance is singular.
    pub fn update(&mut self, measurement: Vector3<f64>) -> bool {
        // observes position only
        let mut h = Matrix3x6::<f64>::zeros();
        h.fixed_view_mut::<3, 3>(0, 0).fill_diagonal(1.0);

        let innovation = measurement - h * self.state;
        let s = h * self.covariance * h.transpose() + self.measurement_noise;
        let Some(s_inv) = s.try_inverse() else {
            return false;
        };
        let gain = self.covariance * h.transpose() * s_inv;

        self.state += gain * innovation;
        self.covariance = (Matrix6::identity() - gain * h) * self.covariance;
        true
    }

    pub fn position(&self) -> Landmark {
        Landmark::new(self.state[0], self.state[1], self.state[2])
    }
}

/// Filters whole hand frames, one landmark at a time.
///
/// A tick without a frame yields nothing and leaves the history untouched;
/// the pipeline calls [`Smoother::reset`] once the recognizer declares the
/// hand lost.
pub struct Smoother {
    method: SmoothingMethod,
    window: usize,
    history: VecDeque<HandFrame>,
    filters: Vec<KalmanFilter>,
    dt: f64,
}

impl Smoother {
    pub fn new(config: &SmoothingConfig, fps: f64) -> Self {
        let window = config.window.max(1);
        Self {
            method: config.method,
            window,
            history: VecDeque::with_capacity(window),
            filters: Vec::new(),
            dt: 1.0 / fps,
        }
    }

    pub fn smooth(&mut self, frame: Option<&HandFrame>) -> Option<HandFrame> {
        let frame = frame?;
        let landmarks = match self.method {
            SmoothingMethod::MovingAverage => self.moving_average(frame),
            SmoothingMethod::Kalman => self.kalman(frame),
        };
        Some(HandFrame::new(landmarks, frame.handedness, frame.confidence))
    }

    fn moving_average(&mut self, frame: &HandFrame) -> Vec<Landmark> {
        self.history.push_back(frame.clone());
        while self.history.len() > self.window {
            self.history.pop_front();
        }

        let count = self.history.len() as f64;
        (0..frame.landmarks.len())
            .map(|i| {
                self.history.iter().fold(Landmark::zeros(), |acc, f| {
                    acc + f.landmarks.get(i).copied().unwrap_or_else(Landmark::zeros)
                }) / count
            })
            .collect()
    }

    fn kalman(&mut self, frame: &HandFrame) -> Vec<Landmark> {
        if self.filters.len() != frame.landmarks.len() {
            self.filters = frame
                .landmarks
                .iter()
                .map(|lm| KalmanFilter::seeded(*lm, self.dt))
                .collect();
            return frame.landmarks.clone();
        }

        self.filters
            .iter_mut()
            .zip(frame.landmarks.iter())
            .map(|(filter, lm)| {
                filter.predict();
                if !filter.update(*lm) {
                    debug!("singular innovation covariance, keeping prediction");
                }
                filter.position()
            })
            .collect()
    }

    /// Forget every past frame.
    pub fn reset(&mut self) {
        self.history.clear();
        self.filters.clear();
    }

    /// Frames currently contributing to the moving average.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fixtures::{open_hand, shifted};

    fn average() -> Smoother {
        Smoother::new(&SmoothingConfig::default(), 30.0)
    }

    fn assert_frames_close(a: &HandFrame, b: &HandFrame, eps: f64) {
        for (x, y) in a.landmarks.iter().zip(b.landmarks.iter()) {
            assert!((x - y).norm() < eps, "{x:?} vs {y:?}");
        }
    }

    #[test]
    fn test_identical_frames_are_a_fixed_point() {
        let mut smoother = average();
        let frame = open_hand();
        let mut out = None;
        for _ in 0..5 {
            out = smoother.smooth(Some(&frame));
        }
        assert_frames_close(&out.unwrap(), &frame, 1e-9);
    }

    #[test]
    fn test_warm_up_averages_available_frames() {
        let mut smoother = average();
        let a = open_hand();
        let b = shifted(&a, 10.0, -20.0);
        smoother.smooth(Some(&a));
        let out = smoother.smooth(Some(&b)).unwrap();
        assert_frames_close(&out, &shifted(&a, 5.0, -10.0), 1e-9);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut smoother = average();
        let base = open_hand();
        for i in 0..8 {
            smoother.smooth(Some(&shifted(&base, i as f64, 0.0)));
        }
        assert_eq!(smoother.len(), 5);
        // frames 3..=7 remain
        let out = smoother.smooth(Some(&shifted(&base, 8.0, 0.0))).unwrap();
        assert_frames_close(&out, &shifted(&base, 6.0, 0.0), 1e-9);
    }

    #[test]
    fn test_missing_frame_yields_nothing() {
        let mut smoother = average();
        smoother.smooth(Some(&open_hand()));
        assert!(smoother.smooth(None).is_none());
        assert_eq!(smoother.len(), 1);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut smoother = average();
        smoother.smooth(Some(&open_hand()));
        smoother.reset();
        assert!(smoother.is_empty());
        let moved = shifted(&open_hand(), 200.0, 0.0);
        assert_frames_close(&smoother.smooth(Some(&moved)).unwrap(), &moved, 1e-9);
    }

    #[test]
    fn test_metadata_comes_from_latest_frame() {
        let mut smoother = average();
        smoother.smooth(Some(&open_hand()));
        let mut latest = open_hand();
        latest.confidence = 0.7;
        latest.handedness = crate::landmarks::Handedness::Left;
        let out = smoother.smooth(Some(&latest)).unwrap();
        assert_eq!(out.confidence, 0.7);
        assert_eq!(out.handedness, crate::landmarks::Handedness::Left);
    }

    #[test]
    fn test_kalman_seeds_on_first_frame_and_tracks_still_hand() {
        let config = SmoothingConfig {
            window: 5,
            method: SmoothingMethod::Kalman,
        };
        let mut smoother = Smoother::new(&config, 30.0);
        let frame = open_hand();
        assert_frames_close(&smoother.smooth(Some(&frame)).unwrap(), &frame, 1e-9);
        let mut out = None;
        for _ in 0..10 {
            out = smoother.smooth(Some(&frame));
        }
        assert_frames_close(&out.unwrap(), &frame, 1e-6);
    }

    #[test]
    fn test_kalman_lags_behind_a_jump() {
        let config = SmoothingConfig {
            window: 5,
            method: SmoothingMethod::Kalman,
        };
        let mut smoother = Smoother::new(&config, 30.0);
        let frame = open_hand();
        smoother.smooth(Some(&frame));
        let jumped = shifted(&frame, 100.0, 0.0);
        let out = smoother.smooth(Some(&jumped)).unwrap();
        let x = out.landmarks[0].x;
        assert!(x > 600.0 && x < 700.0, "x = {x}");
    }
}
