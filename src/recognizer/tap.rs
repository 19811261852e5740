// src/recognizer/tap.rs
use super::debounce::{Candidate, Debouncer};
use crate::config::TapConfig;
use crate::geometry::{depth_delta, finger_extension};
use crate::gesture::{margin_confidence, GestureKind, GestureParameters};
use crate::landmarks::{Finger, HandFrame};

/// Index fingertip pushed toward the sensor while pointing.
#[derive(Debug, Clone)]
pub struct TapDetector {
    config: TapConfig,
    previous: Option<HandFrame>,
    debouncer: Debouncer,
}

impl TapDetector {
    pub fn new(config: TapConfig, debounce_frames: u32) -> Self {
        Self {
            config,
            previous: None,
            debouncer: Debouncer::new(debounce_frames),
        }
    }

    fn classify(&self, frame: &HandFrame) -> Option<Candidate> {
        let previous = self.previous.as_ref()?;
        // extension is measured on the frame before the push
        if finger_extension(previous, Finger::Index) <= self.config.extension_threshold {
            return None;
        }
        let dz = depth_delta(previous, frame, Finger::Index);
        if dz >= -self.config.z_threshold {
            return None;
        }
        Some(Candidate {
            kind: GestureKind::Tap,
            confidence: margin_confidence(-dz - self.config.z_threshold, self.config.z_threshold),
            parameters: GestureParameters {
                depth_change: Some(dz),
                ..Default::default()
            },
        })
    }

    pub fn update(&mut self, frame: &HandFrame) -> Option<Candidate> {
        let candidate = self.classify(frame);
        self.previous = Some(frame.clone());
        self.debouncer.observe(candidate)
    }

    pub fn interrupt(&mut self) {
        self.debouncer.clear();
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.debouncer.clear();
    }
}
